use bytes::Bytes;

use crate::param::STATUS_CODES;

const FALLBACK_STYLE: &str = "body { width: 35em; margin: 0 auto; font-family: Tahoma, Verdana, Arial, sans-serif; }";

/// 错误站点目录中缺少 `<code>.html` 时使用的内置页面
pub fn fallback_page(code: u16) -> Bytes {
    let reason = STATUS_CODES.get(&code).copied().unwrap_or("Unknown");
    Bytes::from(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{code} {reason}</title><style>{style}</style></head>\n\
         <body><h1>{code}</h1><p>{reason}</p><hr><address>{server}</address></body>\n\
         </html>\n",
        code = code,
        reason = reason,
        style = FALLBACK_STYLE,
        server = crate::param::SERVER_NAME,
    ))
}

/// 以 1024 为进制的人类可读字节数，用于启动日志
pub fn format_size(size: usize) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
        assert_eq!(format_size(9926), "9.7 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 - 1), "1024.0 KB");
    }

    #[test]
    fn test_fallback_page_known_code() {
        let page = fallback_page(404);
        let html = std::str::from_utf8(&page).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>404 Not Found</title>"));
        assert!(html.contains("ElServePie/0.1"));
    }

    #[test]
    fn test_fallback_page_unknown_code_does_not_panic() {
        let page = fallback_page(999);
        let html = std::str::from_utf8(&page).unwrap();
        assert!(html.contains("999 Unknown"));
    }
}
