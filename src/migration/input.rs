use crate::storage::{InvalidTenantId, TenantId};

/// Eine Zeile der Input-Datei: `source,destination`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationRequest {
    /// 1-basiert
    pub line: usize,
    pub source: TenantId,
    pub destination: TenantId,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("line {line}: expected `source,destination`, got {raw:?}")]
    Format { line: usize, raw: String },
    #[error("line {line}: not valid UTF-8")]
    Encoding { line: usize },
    #[error("line {line}: {source}")]
    Tenant {
        line: usize,
        #[source]
        source: InvalidTenantId,
    },
}

/// Rohe Zeile aus der Datei, inklusive Zeilenende
pub fn parse_raw_line(line: usize, raw: &[u8]) -> Result<Option<MigrationRequest>, InputError> {
    let text = std::str::from_utf8(raw).map_err(|_| InputError::Encoding { line })?;
    parse_line(line, text)
}

/// Leere Zeilen ergeben `Ok(None)`, leere Felder nach dem Ziel werden ignoriert
pub fn parse_line(line: usize, raw: &str) -> Result<Option<MigrationRequest>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split(',').collect();
    let [source, destination, rest @ ..] = fields.as_slice() else {
        return Err(InputError::Format {
            line,
            raw: trimmed.to_string(),
        });
    };
    if rest.iter().any(|field| !field.trim().is_empty()) {
        return Err(InputError::Format {
            line,
            raw: trimmed.to_string(),
        });
    }

    let parse = |field: &str| {
        field
            .parse::<TenantId>()
            .map_err(|source| InputError::Tenant { line, source })
    };

    Ok(Some(MigrationRequest {
        line,
        source: parse(*source)?,
        destination: parse(*destination)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        let request = parse_line(3, "1000123,1000234\n").unwrap().unwrap();
        assert_eq!(request.line, 3);
        assert_eq!(request.source, TenantId::new(1000123));
        assert_eq!(request.destination, TenantId::new(1000234));

        let spaced = parse_line(1, " 1000123 , 1000234 ").unwrap().unwrap();
        assert_eq!(spaced.destination, TenantId::new(1000234));
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line(1, ""), Ok(None));
        assert_eq!(parse_line(1, "   \r"), Ok(None));
    }

    #[test]
    fn test_trailing_empty_fields() {
        let request = parse_line(1, "1000123,1000234,").unwrap().unwrap();
        assert_eq!(request.source, TenantId::new(1000123));
        assert_eq!(request.destination, TenantId::new(1000234));
        assert!(parse_line(1, "1000123,1000234, ,").unwrap().is_some());
    }

    #[test]
    fn test_raw_line_encoding() {
        let request = parse_raw_line(1, b"1000123,1000234\r\n").unwrap().unwrap();
        assert_eq!(request.destination, TenantId::new(1000234));
        assert_eq!(
            parse_raw_line(2, b"\xff\xfe,1\n"),
            Err(InputError::Encoding { line: 2 })
        );
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_line(2, "1000123"),
            Err(InputError::Format {
                line: 2,
                raw: "1000123".to_string()
            })
        );
        assert!(matches!(
            parse_line(4, "1,2,3"),
            Err(InputError::Format { line: 4, .. })
        ));
        assert_eq!(
            parse_line(5, "1000123,abc"),
            Err(InputError::Tenant {
                line: 5,
                source: InvalidTenantId("abc".to_string())
            })
        );
    }
}
