// ==========================================
// 整车厂运营台账 - 车型批量导入
// ==========================================
// 文件格式: 每行一条，制表符分隔
//   code \t name \t year \t displacement \t engineType
// 规则:
// - 目录中已存在的 code 静默跳过
// - 字段不足、数值无法解析或非 UTF-8 的行记为拒绝，继续导入后续行
// - 行号为文件行号（空行计入）
// ==========================================

use crate::domain::types::EngineType;
use crate::importer::error::{ImportError, ImportResult};
use crate::registry::ModelCatalog;
use csv::{ByteRecord, ReaderBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

const FIELD_COUNT: usize = 5;

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub row: usize, // 从 1 开始
    pub reason: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub loaded: usize,
    pub skipped_duplicates: usize,
    pub rejected: Vec<RejectedRow>,
}

/// 解析后的车型行
#[derive(Debug, Clone, PartialEq)]
struct ModelRow {
    code: String,
    name: String,
    year: i32,
    displacement_cc: f32,
    engine_type: EngineType,
}

// ==========================================
// ModelLoader - 车型导入器
// ==========================================
pub struct ModelLoader {
    current_year: i32,
}

impl ModelLoader {
    /// # 参数
    /// - `current_year`: 计算可持续性指数的参考年份
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    /// 从文件导入
    #[instrument(skip(self, file_path, catalog), fields(path = %file_path.as_ref().display()))]
    pub fn load_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        catalog: &mut ModelCatalog,
    ) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        self.load_reader(file, catalog)
    }

    /// 从任意读取源导入
    pub fn load_reader<R: Read>(
        &self,
        reader: R,
        catalog: &mut ModelCatalog,
    ) -> ImportResult<ImportSummary> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .quoting(false)
            .from_reader(reader);

        let mut summary = ImportSummary::default();
        // 按字节读取: 非 UTF-8 的行只拒绝该行，不中断导入
        for result in reader.byte_records() {
            let record = result?;
            // 行号取文件行号，空行也计入
            let row = record.position().map_or(0, |p| p.line() as usize);

            // 跳过完全空白的行
            if record.iter().all(|v| v.iter().all(u8::is_ascii_whitespace)) {
                continue;
            }
            summary.total_rows += 1;

            let parsed = match decode_fields(row, &record).and_then(|fields| parse_row(row, &fields)) {
                Ok(parsed) => parsed,
                Err(e) if e.is_row_level() => {
                    warn!(row, error = %e, "车型行被拒绝");
                    summary.rejected.push(RejectedRow {
                        row,
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let inserted = catalog.add_model(
                &parsed.code,
                &parsed.name,
                parsed.year,
                parsed.displacement_cc,
                parsed.engine_type,
                self.current_year,
            );
            if inserted {
                summary.loaded += 1;
            } else {
                summary.skipped_duplicates += 1;
            }
        }

        info!(
            total_rows = summary.total_rows,
            loaded = summary.loaded,
            skipped_duplicates = summary.skipped_duplicates,
            rejected = summary.rejected.len(),
            "车型导入完成"
        );
        Ok(summary)
    }
}

fn decode_fields(row: usize, record: &ByteRecord) -> ImportResult<Vec<&str>> {
    record
        .iter()
        .map(|field| {
            std::str::from_utf8(field)
                .map(str::trim)
                .map_err(|_| ImportError::InvalidEncoding { row })
        })
        .collect()
}

fn parse_row(row: usize, fields: &[&str]) -> ImportResult<ModelRow> {
    if fields.len() < FIELD_COUNT {
        return Err(ImportError::ColumnCount {
            row,
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }
    if fields[0].is_empty() {
        return Err(ImportError::EmptyCode { row });
    }

    let year: i32 = fields[2].parse().map_err(|_| invalid_field(row, "year", fields[2]))?;
    let displacement_cc: f32 = fields[3]
        .parse()
        .map_err(|_| invalid_field(row, "displacement", fields[3]))?;
    let engine_type = fields[4]
        .parse::<i64>()
        .ok()
        .and_then(EngineType::from_code)
        .ok_or_else(|| invalid_field(row, "engineType", fields[4]))?;

    Ok(ModelRow {
        code: fields[0].to_string(),
        name: fields[1].to_string(),
        year,
        displacement_cc,
        engine_type,
    })
}

fn invalid_field(row: usize, field: &'static str, value: &str) -> ImportError {
    ImportError::InvalidField {
        row,
        field,
        value: value.to_string(),
    }
}
