//! Newline-delimited batch protocol.
//!
//! A request is a header line `<method> <N>` followed by `N` sentence
//! lines. The method is `x` (extract) or `e` (encode). The response is a
//! line holding the number of output records followed by the records:
//!
//! ```text
//! > x 1
//! > chest pain today
//! < 1
//! < C001 2
//! ```
//!
//! A malformed header ends the session after one diagnostic line.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ConceptError, Result};
use crate::finder::ConceptFinder;

/// Operation requested by a batch header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Report `"<cui> <length>"` per concept.
    Extract,
    /// Rewrite each sentence with concepts replaced by CUIs.
    Encode,
}

impl Method {
    /// Wire token of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Extract => "x",
            Method::Encode => "e",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConceptError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x" => Ok(Method::Extract),
            "e" => Ok(Method::Encode),
            _ => Err(ConceptError::protocol(format!("unknown method {s:?}"))),
        }
    }
}

/// A parsed batch header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Requested operation.
    pub method: Method,
    /// Number of sentence lines that follow.
    pub count: usize,
}

impl RequestHeader {
    /// Parse a header line.
    ///
    /// On failure the error holds the diagnostic line to send back.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let mut parts = line.split_whitespace();

        let method = match parts.next().map(str::parse::<Method>) {
            Some(Ok(method)) => method,
            _ => return Err(format!("invalid method: {line}")),
        };

        match parts.next().map(str::parse::<usize>) {
            Some(Ok(count)) => Ok(RequestHeader { method, count }),
            _ => Err(format!("invalid number of sentences: {line}")),
        }
    }
}

/// How a protocol session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input stream was exhausted.
    EndOfInput,
    /// A malformed header was answered with this diagnostic.
    Rejected(String),
}

/// Serves batch requests against a [`ConceptFinder`].
pub struct ProtocolServer<'a> {
    finder: &'a ConceptFinder,
}

impl<'a> ProtocolServer<'a> {
    /// Create a server backed by `finder`.
    pub fn new(finder: &'a ConceptFinder) -> Self {
        ProtocolServer { finder }
    }

    /// Answer requests from `reader` on `writer` until the input ends or a
    /// malformed header arrives.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<SessionEnd> {
        let mut requests = 0usize;

        while let Some(line) = read_line(&mut reader)? {
            if line.trim().is_empty() {
                continue;
            }

            let header = match RequestHeader::parse(&line) {
                Ok(header) => header,
                Err(diagnostic) => {
                    warn!("Rejecting request after {requests} served: {diagnostic}");
                    writeln!(writer, "{diagnostic}")?;
                    writer.flush()?;
                    return Ok(SessionEnd::Rejected(diagnostic));
                }
            };

            let mut sentences = Vec::with_capacity(header.count);
            for _ in 0..header.count {
                let sentence = read_line(&mut reader)?.unwrap_or_default();
                sentences.push(sentence.trim().to_string());
            }

            let output = match header.method {
                Method::Extract => self.finder.extract(&sentences),
                Method::Encode => self.finder.encode(&sentences),
            };
            debug!(
                "Request {}: {} {} sentence(s) -> {} record(s)",
                requests,
                header.method,
                header.count,
                output.len()
            );

            write_response(&mut writer, &output)?;
            requests += 1;
        }

        info!("Input closed after {requests} request(s)");
        Ok(SessionEnd::EndOfInput)
    }
}

/// Write a count line followed by the records, then flush.
pub fn write_response<W: Write>(writer: &mut W, records: &[String]) -> Result<()> {
    writeln!(writer, "{}", records.len())?;
    for record in records {
        writeln!(writer, "{record}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read one line without its terminator, `None` at end of input.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

/// Client side of the batch protocol, e.g. over a child process's pipes.
pub struct ProtocolClient<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ProtocolClient<R, W> {
    /// Create a client reading responses from `reader` and writing
    /// requests to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        ProtocolClient { reader, writer }
    }

    /// Extract concepts as `(cui, length)` pairs.
    pub fn extract_concepts<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<Vec<(String, usize)>> {
        self.request(Method::Extract, sentences)?
            .iter()
            .map(|record| {
                let parsed = record
                    .split_once(' ')
                    .and_then(|(cui, length)| Some((cui.to_string(), length.parse::<usize>().ok()?)));
                parsed.ok_or_else(|| {
                    ConceptError::protocol(format!("malformed extract record {record:?}"))
                })
            })
            .collect()
    }

    /// Encode sentences, one output line per sentence.
    pub fn encode_concepts<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<Vec<String>> {
        self.request(Method::Encode, sentences)
    }

    /// Send one request and read its records.
    pub fn request<S: AsRef<str>>(&mut self, method: Method, sentences: &[S]) -> Result<Vec<String>> {
        if let Some(bad) = sentences.iter().find(|s| s.as_ref().contains('\n')) {
            return Err(ConceptError::protocol(format!(
                "sentence spans several lines: {:?}",
                bad.as_ref()
            )));
        }

        writeln!(self.writer, "{} {}", method, sentences.len())?;
        for sentence in sentences {
            writeln!(self.writer, "{}", sentence.as_ref())?;
        }
        self.writer.flush()?;

        let header = self.expect_line()?;
        let count: usize = header
            .trim()
            .parse()
            .map_err(|_| ConceptError::protocol(format!("unexpected response: {header}")))?;

        (0..count).map(|_| self.expect_line()).collect()
    }

    fn expect_line(&mut self) -> Result<String> {
        read_line(&mut self.reader)?
            .ok_or_else(|| ConceptError::protocol("server closed the stream"))
    }

    /// Give back the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
