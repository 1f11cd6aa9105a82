/// 验证表格文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（包含点号，如 ".xlsx"）
///
/// # Returns
/// * `true` - 魔术字节匹配或该类型不需要验证
/// * `false` - 魔术字节不匹配
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // MS Office 旧格式 (OLE Compound Document)
        ".xls" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // OOXML 与 OpenDocument 都是 ZIP 容器
        ".xlsx" | ".ods" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        // 文本格式：不能是二进制容器
        ".csv" => {
            !data.starts_with(&[0x50, 0x4B, 0x03, 0x04])
                && !data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0])
                && !data.iter().take(512).any(|b| *b == 0)
        }
        // 未知格式 - 默认拒绝
        _ => false,
    }
}
