use calamine::Data;

/// 单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl SheetCell {
    /// 转为文本；数字不带本地化格式，整数形式的浮点数不带小数部分
    pub fn to_text(&self) -> Option<String> {
        match self {
            SheetCell::Empty => None,
            SheetCell::Text(s) => Some(s.clone()),
            SheetCell::Number(n) => Some(format_number(*n)),
            SheetCell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

impl From<&Data> for SheetCell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => SheetCell::Empty,
            Data::String(s) => SheetCell::Text(s.clone()),
            Data::Float(n) => SheetCell::Number(*n),
            Data::Int(n) => SheetCell::Number(*n as f64),
            Data::Bool(b) => SheetCell::Bool(*b),
            // 日期按序列号保留
            Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
        }
    }
}

/// 102.0 → "102"，80.5 → "80.5"
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// 已读入内存的整张表，第一行为表头
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<SheetCell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<SheetCell>>) -> Self {
        Self { rows }
    }

    /// 便于测试与 csv 读取的文本构造
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        if cell.is_empty() {
                            SheetCell::Empty
                        } else {
                            SheetCell::Text(cell.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&[SheetCell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// 数据行（不含表头）
    pub fn data_rows(&self) -> &[Vec<SheetCell>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}
