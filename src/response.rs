use bytes::Bytes;
use log::error;

use crate::param::{FALLBACK_VERSION, LF, SERVER_NAME, STATUS_CODES};

/// 一个完整的响应。
///
/// 响应头按插入顺序序列化，且总是包含 `Server`、`Content-Type` 和 `Content-Length`，
/// 其中 `Content-Length` 等于 `body` 的字节数。
#[derive(Debug, Clone)]
pub struct Response {
    version: String,
    status_code: u16,
    information: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn new(code: u16, content_type: &str, body: Bytes) -> Self {
        let mut response = Self {
            version: FALLBACK_VERSION.to_string(),
            status_code: 200,
            information: "OK".to_string(),
            headers: Vec::with_capacity(3),
            body,
        };
        response.set_code(code);
        response.set_header("Server", SERVER_NAME);
        response.set_header("Content-Type", content_type);
        let content_length = response.body.len().to_string();
        response.set_header("Content-Length", &content_length);
        response
    }

    pub fn set_version(&mut self, version: &str) -> &mut Self {
        self.version = version.to_string();
        self
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&information) => information.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                "Unknown".to_string()
            }
        };
        self
    }

    /// 设置响应头。已存在的同名响应头原位替换，否则追加到末尾。
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// 序列化为 `"<version> <status>\n" + "Name: Value\n"* + "\n" + body`。
    ///
    /// 行分隔符是裸 LF 而不是 HTTP 要求的 CRLF，这是既有客户端依赖的行为。
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut head = String::with_capacity(128);
        head.push_str(&self.version);
        head.push(' ');
        head.push_str(&self.status_line());
        head.push_str(LF);
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str(LF);
        }
        head.push_str(LF);

        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

impl Response {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    /// 例如 `"200 OK"`
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status_code, self.information)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
