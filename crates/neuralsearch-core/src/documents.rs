//! Line-oriented document and vector file readers.
//!
//! Every physical line is one record, blank lines included, because the index
//! pipeline pairs documents with vectors purely by position. Invalid UTF-8 is
//! decoded lossily rather than rejected.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Document;

/// Iterator over the lines of a reader with `\n` / `\r\n` stripped.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") { self.buf.pop(); }
                if self.buf.ends_with(b"\r") { self.buf.pop(); }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Yields `Document`s numbered from 0 in file order.
pub struct DocumentReader<R> {
    lines: LossyLines<R>,
    next_ordinal: usize,
}

impl<R: BufRead> DocumentReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: LossyLines::new(reader), next_ordinal: 0 }
    }
}

impl<R: BufRead> Iterator for DocumentReader<R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        Some(line.map(|l| Document::new(ordinal, &l)).map_err(Error::from))
    }
}

pub fn open_file(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        return Err(Error::NotFound(format!("{} does not exist", path.display())));
    }
    Ok(BufReader::new(File::open(path)?))
}

pub fn open_documents(path: &Path) -> Result<DocumentReader<BufReader<File>>> {
    Ok(DocumentReader::new(open_file(path)?))
}

/// Writes one document per line, creating parent directories. Returns the count written.
pub fn write_documents<S: AsRef<str>>(path: &Path, docs: &[S]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut out = std::io::BufWriter::new(File::create(path)?);
    for doc in docs {
        writeln!(out, "{}", doc.as_ref().replace(|c: char| c == '\n' || c == '\r', " "))?;
    }
    out.flush()?;
    tracing::info!(count = docs.len(), path = %path.display(), "wrote documents");
    Ok(docs.len())
}

/// Small built-in corpus in the style of MS MARCO passages.
pub fn sample_documents() -> &'static [&'static str] {
    SAMPLE_DOCUMENTS
}

const SAMPLE_DOCUMENTS: &[&str] = &[
    "A federal tax identification number (also known as an employer identification number or EIN), is a number assigned solely to your business by the IRS.",
    "A federal tax identification number is used to identify your business to several federal agencies responsible for the regulation of business.",
    "Let's start at the beginning. A tax ID number or employer identification number (EIN) is a number assigned to a business, much like a social security number does for a person.",
    "The bank routing number is a 9-digit number that identifies the financial institution where your account is held.",
    "A routing number, also known as an ABA number or routing transit number, is used to identify a specific bank or credit union.",
    "Bank transit numbers are used for electronic transfers, direct deposits, and automatic bill payments.",
    "Financial institutions use routing numbers to process checks, wire transfers, and ACH transactions.",
    "The Federal Reserve uses routing numbers to process Fedwire funds transfers and automated clearing house transactions.",
    "Credit unions and banks are assigned unique routing numbers by the American Bankers Association.",
    "Electronic fund transfers require both the bank routing number and the account number to complete the transaction.",
    "The presence of communication amid scientific minds was equally important to the success of the Manhattan Project as scientific intellect was. The only cloud hanging over the impressive achievement of the atomic researchers and engineers is what their success truly meant; hundreds of thousands of innocent lives obliterated.",
    "The 23,000-square-mile (60,000 km2) Matanuska-Susitna Borough was established in 1964 with the merger of the Matanuska-Susitna Borough and part of the former Valdez-Cordova Census Area. The borough seat is Palmer, and the largest city is Wasilla.",
    "The researchers were in Baltimore on Tuesday to present their findings at a medical conference. The study's results were more promising than initially believed.",
    "Neural networks are computing systems inspired by biological neural networks that constitute animal brains. Such systems learn to perform tasks by considering examples, generally without being programmed with task-specific rules.",
    "Machine learning is a method of data analysis that automates analytical model building. It is a branch of artificial intelligence based on the idea that systems can learn from data, identify patterns and make decisions with minimal human intervention.",
    "Deep learning is part of a broader family of machine learning methods based on artificial neural networks with representation learning.",
    "Natural language processing combines computational linguistics with statistical, machine learning, and deep learning models to give computers the ability to process human language.",
    "Vector embeddings are numerical representations of data that capture semantic meaning and relationships between different items in a high-dimensional space.",
    "Semantic search uses meaning and context rather than just keyword matching to provide more relevant search results.",
    "Information retrieval systems help users find information that matches their information needs from large collections of documents or data.",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_keeps_blank_lines_and_ordinals() {
        let input = Cursor::new("alpha\n\n  gamma  \r\ndelta");
        let docs: Vec<Document> = DocumentReader::new(input).collect::<Result<_>>().unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[1], Document { ordinal: 1, text: String::new() });
        assert_eq!(docs[2].text, "gamma");
        assert_eq!(docs[3].ordinal, 3);
    }

    #[test]
    fn lossy_lines_replace_invalid_utf8() {
        let input = Cursor::new(b"ok\n\xffbad\n".to_vec());
        let lines: Vec<String> = LossyLines::new(input).map(|l| l.unwrap()).collect();
        assert_eq!(lines[0], "ok");
        assert!(lines[1].ends_with("bad"));
    }
}
