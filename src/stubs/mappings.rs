//! Line-granular source map v3 encoding for the fake engines.
//!
//! Every generated line carries at most one segment, at column 0, pointing
//! at column 0 of an original line in a single source.

use serde_json::json;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMap {
    pub file: String,
    pub source: String,
    /// Original line (0-based) for each generated line (0-based).
    pub lines: Vec<Option<u32>>,
}

impl LineMap {
    /// Maps `count` original lines onto generated lines shifted down by `offset`.
    pub fn shifted(file: &str, source: &str, count: usize, offset: usize) -> Self {
        let mut lines = vec![None; offset];
        lines.extend((0..count as u32).map(Some));
        Self {
            file: file.to_string(),
            source: source.to_string(),
            lines,
        }
    }

    pub fn original_line(&self, generated_line: u32) -> Option<u32> {
        self.lines.get(generated_line as usize).copied().flatten()
    }

    /// Chains `self` (generated → intermediate) with `input`
    /// (intermediate → original).
    pub fn compose(&self, input: &LineMap) -> LineMap {
        LineMap {
            file: self.file.clone(),
            source: input.source.clone(),
            lines: self
                .lines
                .iter()
                .map(|line| line.and_then(|l| input.original_line(l)))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "version": 3,
            "file": self.file,
            "sources": [self.source],
            "names": [],
            "mappings": self.encode_mappings(),
        })
    }

    pub fn from_json(value: &serde_json::Value) -> Option<LineMap> {
        let mappings = value.get("mappings")?.as_str()?;
        let source = value
            .get("sources")?
            .as_array()?
            .first()?
            .as_str()?
            .to_string();
        let file = value
            .get("file")
            .and_then(|f| f.as_str())
            .unwrap_or_default()
            .to_string();

        let mut original = 0i64;
        let mut lines = Vec::new();
        for line in mappings.split(';') {
            let mut mapped = None;
            for segment in line.split(',').filter(|s| !s.is_empty()) {
                let fields = decode_segment(segment)?;
                if fields.len() >= 4 {
                    original += fields[2];
                    if mapped.is_none() {
                        mapped = u32::try_from(original).ok();
                    }
                }
            }
            lines.push(mapped);
        }

        Some(LineMap {
            file,
            source,
            lines,
        })
    }

    pub fn parse(map: &str) -> Option<LineMap> {
        let value: serde_json::Value = serde_json::from_str(map).ok()?;
        Self::from_json(&value)
    }

    fn encode_mappings(&self) -> String {
        let mut previous = 0i64;
        self.lines
            .iter()
            .map(|line| match line {
                Some(original) => {
                    let delta = *original as i64 - previous;
                    previous = *original as i64;
                    [0, 0, delta, 0].iter().map(|v| encode_vlq(*v)).collect()
                }
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn encode_vlq(value: i64) -> String {
    let mut rest = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    let mut out = String::new();
    loop {
        let mut digit = (rest & 0b11111) as usize;
        rest >>= 5;
        if rest > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64[digit] as char);
        if rest == 0 {
            return out;
        }
    }
}

fn decode_segment(segment: &str) -> Option<Vec<i64>> {
    let mut fields = Vec::new();
    let mut value = 0i64;
    let mut shift = 0;
    for byte in segment.bytes() {
        let digit = BASE64.iter().position(|b| *b == byte)? as i64;
        value += (digit & 0b11111) << shift;
        if digit & 0b100000 != 0 {
            shift += 5;
            continue;
        }
        fields.push(if value & 1 == 1 {
            -(value >> 1)
        } else {
            value >> 1
        });
        value = 0;
        shift = 0;
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_known_mappings() {
        let map = LineMap::shifted("out.js", "in.coffee", 2, 1);
        assert_eq!(map.to_json()["mappings"], ";AAAA;AACA");
    }

    #[test]
    fn test_decodes_negative_and_multi_digit_deltas() {
        let map = LineMap {
            file: "out.js".to_string(),
            source: "in.js".to_string(),
            lines: vec![Some(40), None, Some(3), Some(100)],
        };
        let decoded = LineMap::from_json(&map.to_json()).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn test_compose_follows_both_maps() {
        let front = LineMap::shifted("a.js", "a.coffee", 3, 1);
        let back = LineMap::shifted("a.js", "a.js", 5, 2);
        let composed = back.compose(&front);

        assert_eq!(composed.source, "a.coffee");
        assert_eq!(composed.original_line(2), None);
        assert_eq!(composed.original_line(3), Some(0));
        assert_eq!(composed.original_line(5), Some(2));
    }
}
