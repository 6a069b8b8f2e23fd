use std::{collections::HashMap, fs, path::Path};

use log::debug;

use crate::{
    exception::ServerError,
    param::{DEFAULT_MIME, MIME_TYPES},
};

// 表中用于覆盖默认类型的键
const DEFAULT_KEY: &str = "*";

/// 扩展名到 Content-Type 的只读映射表，启动时构建一次。
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, String>,
    default: String,
}

impl MimeTable {
    /// 使用 `param.rs` 中的内置表
    pub fn builtin() -> Self {
        let types = MIME_TYPES
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        Self {
            types,
            default: DEFAULT_MIME.to_string(),
        }
    }

    /// 从 JSON 文件加载，格式为 `{".html": "text/html", ...}`，键前的点可以省略。
    pub fn from_json(path: &Path) -> Result<Self, ServerError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ServerError::MimeTable(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ServerError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(text).map_err(|e| ServerError::MimeTable(e.to_string()))?;

        let mut default = DEFAULT_MIME.to_string();
        let mut types = HashMap::with_capacity(raw.len());
        for (key, mime) in raw {
            if key == DEFAULT_KEY {
                default = mime;
                continue;
            }
            let ext = key.strip_prefix('.').unwrap_or(&key).to_string();
            types.insert(ext, mime);
        }
        debug!("已载入{}条MIME类型", types.len());
        Ok(Self { types, default })
    }

    /// 根据路径最后一段的扩展名查找 Content-Type
    pub fn lookup(&self, path: &str) -> &str {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.types.get(ext))
            .unwrap_or(&self.default)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
