//! Decoding and row parsing for the cleaned catalog CSV export.

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, GB18030};
use thiserror::Error;

use crate::models::LaptopRecord;
use crate::parser::parse_ram_gb;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("No supported encoding could decode the file")]
    UndecodableFile,

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Malformed header row: {0}")]
    Header(String),
}

/// A row that could not be turned into a catalog record.
#[derive(Debug, Error)]
#[error("line {line}: {reason}")]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

/// A parsed catalog row plus its optional review text.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub line: u64,
    pub original_id: String,
    pub name: String,
    pub price: Option<f64>,
    pub shop: Option<String>,
    pub brand: Option<String>,
    pub ram: Option<String>,
    pub cpu: Option<String>,
    pub sales: Option<i64>,
    pub comment: Option<String>,
}

impl CsvRow {
    #[must_use]
    pub fn into_record(self, rating: Option<f64>) -> LaptopRecord {
        let ram_gb = self.ram.as_deref().and_then(parse_ram_gb);
        LaptopRecord {
            original_id: self.original_id,
            name: self.name,
            price: self.price,
            shop: self.shop,
            brand: self.brand,
            ram: self.ram,
            cpu: self.cpu,
            sales: self.sales,
            rating,
            ram_gb,
        }
    }
}

#[derive(Debug)]
pub struct ParsedCsv {
    pub encoding: &'static str,
    pub rows: Vec<Result<CsvRow, RowError>>,
}

/// Accepted header spellings per column; the first match wins.
const COLUMNS: [(&str, &[&str]); 8] = [
    ("id", &["id"]),
    ("name", &["name"]),
    ("price", &["price"]),
    ("shop", &["shop"]),
    ("brand", &["品牌", "brand"]),
    ("ram", &["内存", "ram"]),
    ("cpu", &["CPU", "cpu"]),
    ("sales", &["销量", "sales"]),
];

/// Decode raw bytes: BOM-tagged UTF-8/UTF-16 first, then strict UTF-8, then GB18030.
pub fn decode(bytes: &[u8]) -> Result<(String, &'static str), CsvError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return strict_decode(encoding, &bytes[bom_len..]).ok_or(CsvError::UndecodableFile);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), encoding_rs::UTF_8.name()));
    }

    strict_decode(GB18030, bytes).ok_or(CsvError::UndecodableFile)
}

fn strict_decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<(String, &'static str)> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    (!had_errors).then(|| (text.into_owned(), encoding.name()))
}

struct ColumnMap {
    required: [usize; 8],
    comment: Option<usize>,
}

fn map_columns(headers: &StringRecord) -> Result<ColumnMap, CsvError> {
    let find = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
    };

    let mut required = [0; 8];
    for (slot, (name, aliases)) in required.iter_mut().zip(COLUMNS) {
        *slot = find(aliases).ok_or(CsvError::MissingColumn(name))?;
    }

    Ok(ColumnMap {
        required,
        comment: find(&["comment"][..]),
    })
}

fn text(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_price(raw: Option<String>) -> Result<Option<f64>, String> {
    raw.map(|v| {
        v.parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| format!("invalid price '{v}'"))
    })
    .transpose()
}

/// Sales are integers, but spreadsheet exports sometimes write `120.0`.
fn parse_sales(raw: Option<String>) -> Result<Option<i64>, String> {
    raw.map(|v| {
        v.parse::<i64>()
            .ok()
            .or_else(|| {
                v.parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite() && s.fract() == 0.0)
                    .map(|s| {
                        #[allow(clippy::cast_possible_truncation)]
                        let whole = s as i64;
                        whole
                    })
            })
            .ok_or_else(|| format!("invalid sales '{v}'"))
    })
    .transpose()
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, line: u64) -> Result<CsvRow, RowError> {
    let fail = |reason: String| RowError { line, reason };
    let [id, name, price, shop, brand, ram, cpu, sales] = columns.required;

    let original_id = text(record, id).ok_or_else(|| fail("missing id".to_string()))?;
    let name = text(record, name).ok_or_else(|| fail("missing name".to_string()))?;

    Ok(CsvRow {
        line,
        original_id,
        name,
        price: parse_price(text(record, price)).map_err(fail)?,
        shop: text(record, shop),
        brand: text(record, brand),
        ram: text(record, ram),
        cpu: text(record, cpu),
        sales: parse_sales(text(record, sales)).map_err(fail)?,
        comment: columns.comment.and_then(|idx| text(record, idx)),
    })
}

/// Decode and parse a whole file. Only an undecodable file or a bad header
/// fails the call; malformed rows are returned as `Err` entries.
pub fn parse_catalog(bytes: &[u8]) -> Result<ParsedCsv, CsvError> {
    let (content, encoding) = decode(bytes)?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvError::Header(e.to_string()))?
        .clone();
    let columns = map_columns(&headers)?;

    let rows = reader
        .records()
        .zip(2u64..)
        .map(|(record, line)| match record {
            Ok(record) => parse_row(&record, &columns, line),
            Err(e) => Err(RowError {
                line,
                reason: e.to_string(),
            }),
        })
        .collect();

    Ok(ParsedCsv { encoding, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,price,shop,品牌,内存,CPU,销量,comment\n";

    #[test]
    fn test_decode_utf8_with_and_without_bom() {
        let plain = "id,name\n1,联想\n";
        let (text, enc) = decode(plain.as_bytes()).unwrap();
        assert_eq!(text, plain);
        assert_eq!(enc, "UTF-8");

        let mut with_bom = vec![0xEF, 0xBB, 0xBF];
        with_bom.extend_from_slice(plain.as_bytes());
        let (text, enc) = decode(&with_bom).unwrap();
        assert_eq!(text, plain);
        assert_eq!(enc, "UTF-8");
    }

    #[test]
    fn test_decode_utf16_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "id,name\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (text, enc) = decode(&bytes).unwrap();
        assert_eq!(text, "id,name\n");
        assert_eq!(enc, "UTF-16LE");
    }

    #[test]
    fn test_decode_falls_back_to_gb18030() {
        let (encoded, _, _) = GB18030.encode("品牌,联想\n");
        assert!(std::str::from_utf8(&encoded).is_err());

        let (text, enc) = decode(&encoded).unwrap();
        assert_eq!(text, "品牌,联想\n");
        assert_eq!(enc, "gb18030");
    }

    #[test]
    fn test_parse_catalog_rows() {
        let csv = format!(
            "{HEADER}100,ThinkPad X1,8999,联想官方旗舰店,联想,16GB,i7,1200,很好用\n\
             101,MateBook,,华为店,华为,8G,i5,120.0,\n"
        );

        let parsed = parse_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);

        let first = parsed.rows[0].as_ref().unwrap();
        assert_eq!(first.line, 2);
        assert_eq!(first.original_id, "100");
        assert_eq!(first.price, Some(8999.0));
        assert_eq!(first.brand.as_deref(), Some("联想"));
        assert_eq!(first.sales, Some(1200));
        assert_eq!(first.comment.as_deref(), Some("很好用"));

        let second = parsed.rows[1].as_ref().unwrap();
        assert_eq!(second.price, None);
        assert_eq!(second.sales, Some(120));
        assert_eq!(second.comment, None);

        let record = second.clone().into_record(Some(3.5));
        assert_eq!(record.ram_gb, Some(8));
        assert_eq!(record.rating, Some(3.5));
    }

    #[test]
    fn test_english_headers_without_comment_column() {
        let csv = "id,name,price,shop,brand,ram,cpu,sales\n7,Swift 3,4299,acer,Acer,16GB,R7,90\n";
        let parsed = parse_catalog(csv.as_bytes()).unwrap();
        let row = parsed.rows[0].as_ref().unwrap();
        assert_eq!(row.brand.as_deref(), Some("Acer"));
        assert_eq!(row.comment, None);
    }

    #[test]
    fn test_bad_rows_are_reported_not_fatal() {
        let csv = format!("{HEADER}1,A,abc,s,b,8GB,c,1,\n,B,100,s,b,8GB,c,1,\n3,C,100,s,b,8GB,c,many,\n");
        let parsed = parse_catalog(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 3);
        assert!(parsed.rows.iter().all(Result::is_err));
        assert_eq!(parsed.rows[1].as_ref().unwrap_err().line, 3);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = parse_catalog("id,name,price\n1,a,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn("shop")));
    }
}
