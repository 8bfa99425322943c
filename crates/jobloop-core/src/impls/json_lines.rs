//! JSON-lines job source.
//!
//! 1 行 = 1 ジョブ。空行と `null` は "no work"。
//! パースできない行は warn を出して読み飛ばす（ループは止めない）。

use std::io::BufRead;

use serde_json::Value;
use tracing::warn;

use crate::domain::JobDescriptor;

pub struct JsonLinesSource<R> {
    lines: std::io::Lines<R>,
    line_no: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = JobDescriptor;

    fn next(&mut self) -> Option<JobDescriptor> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, line = self.line_no + 1, "failed to read job input, closing source");
                    return None;
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Some(JobDescriptor::NoWork);
            }

            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => return Some(JobDescriptor::from(value)),
                Err(e) => {
                    warn!(error = %e, line = self.line_no, "skipping unparsable job line");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Job;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn parses_lines_in_order() {
        let input = "[[1], {\"x\": 2}]\n\nnull\n[3, 4]\n";
        let jobs: Vec<_> = JsonLinesSource::new(Cursor::new(input)).collect();

        assert_eq!(
            jobs,
            vec![
                JobDescriptor::Work(Job::from_args(vec![json!(1)]).with_kwarg("x", 2)),
                JobDescriptor::NoWork,
                JobDescriptor::NoWork,
                JobDescriptor::Work(Job::from_args(vec![json!(3), json!(4)])),
            ]
        );
    }

    #[test]
    fn skips_garbage_lines() {
        let input = "{not json\n[\"ok\"]\n";
        let jobs: Vec<_> = JsonLinesSource::new(Cursor::new(input)).collect();

        assert_eq!(jobs, vec![JobDescriptor::Work(Job::from_args(vec![json!("ok")]))]);
    }
}
