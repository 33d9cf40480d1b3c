//! Response status line and headers, as collected from libcurl's header callback.

/// The parts of a response the fetcher needs before reading the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Status code of the final response (after redirects); 0 if no status line was seen.
    pub status: u32,
    /// `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
    /// Raw `Content-Disposition` value, if present.
    pub content_disposition: Option<String>,
}

impl ResponseHead {
    /// 2xx and 3xx are accepted; everything else aborts the fetch.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Collects header lines across a redirect chain, keeping only the last response.
#[derive(Debug, Default)]
pub(crate) struct HeadCollector {
    lines: Vec<String>,
}

impl HeadCollector {
    pub(crate) fn push_raw(&mut self, data: &[u8]) {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            self.lines.clear();
        }
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
    }

    pub(crate) fn head(&self) -> ResponseHead {
        parse_head(&self.lines)
    }
}

/// Parse one response's status line and header lines.
pub(crate) fn parse_head<S: AsRef<str>>(lines: &[S]) -> ResponseHead {
    let mut head = ResponseHead::default();
    for line in lines {
        let line = line.as_ref().trim();
        if line.starts_with("HTTP/") {
            head.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse().ok())
                .unwrap_or(0);
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            head.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-disposition") {
            head.content_disposition = Some(value.to_string());
        }
    }
    head
}
