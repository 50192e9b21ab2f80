use crate::expr::ExprSet;
use crate::filter::{FilterError, FilterSet};
use crate::projector::{KeySelection, Projector, RenderMode};
use crate::record::Record;
use crate::timegrep::TimeRangeSet;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Raw textual options a run is compiled from
#[derive(Debug, Clone, Default)]
pub struct LltsvOptions {
    pub keys: Vec<String>,
    pub ignore_keys: Vec<String>,
    pub no_key: bool,
    pub filters: Vec<String>,
    pub exprs: Vec<String>,
    pub timegreps: Vec<String>,
}

/// Where input lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn name(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Counters returned once every source has been drained
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub lines_emitted: usize,
    pub failed_sources: Vec<String>,
    /// Output was closed by the reader (e.g. `| head`)
    pub output_closed: bool,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed_sources.is_empty()
    }
}

/// A compiled pipeline: expressions, filters, time ranges and projection
#[derive(Debug, Clone)]
pub struct Lltsv {
    exprs: ExprSet,
    filters: FilterSet,
    time_ranges: TimeRangeSet,
    projector: Projector,
}

impl Lltsv {
    /// Compile all specs. Only filters can fail the whole run; broken
    /// expressions and time ranges are logged and dropped.
    pub fn new(options: &LltsvOptions, colorize: bool) -> Result<Self, FilterError> {
        let filters = FilterSet::compile(&options.filters)?;
        let exprs = ExprSet::compile(&options.exprs);
        let time_ranges = TimeRangeSet::compile(&options.timegreps);
        let projector = Projector::new(
            KeySelection::new(options.keys.clone(), options.ignore_keys.clone()),
            RenderMode::select(options.no_key, colorize),
        );

        tracing::debug!(
            filters = filters.len(),
            exprs = exprs.len(),
            time_ranges = time_ranges.len(),
            mode = ?projector.mode(),
            "pipeline compiled"
        );

        Ok(Lltsv {
            exprs,
            filters,
            time_ranges,
            projector,
        })
    }

    /// Run one line through the pipeline; `None` when it is filtered out
    pub fn process_line(&self, line: &str) -> Option<String> {
        let mut record = Record::parse(line);
        self.exprs.apply(&mut record);

        if !self.filters.matches(&record) || !self.time_ranges.contains(&record) {
            return None;
        }

        Some(self.projector.project(&record))
    }

    /// Process every line of `reader`, writing survivors to `out`.
    ///
    /// Returns the number of lines read and emitted.
    pub fn scan_and_write<R: BufRead, W: Write>(
        &self,
        reader: R,
        out: &mut W,
    ) -> io::Result<(usize, usize)> {
        self.scan_tracked(reader, out).map_err(|e| match e {
            ScanError::Read { error, .. } => error,
            ScanError::Write(error) => error,
        })
    }

    /// Drain each source in order. A source that cannot be opened or read
    /// is reported and recorded as failed; the remaining ones still run.
    /// Errors writing to `out` stop the run.
    pub fn run_sources<W: Write>(&self, sources: &[Source], out: &mut W) -> io::Result<RunSummary> {
        let mut summary = RunSummary::default();

        for source in sources {
            let result = match source {
                Source::Stdin => self.scan_tracked(io::stdin().lock(), out),
                Source::File(path) => match open(path) {
                    Ok(reader) => self.scan_tracked(reader, out),
                    Err(e) => {
                        tracing::error!(file = %path.display(), "failed to open: {e}");
                        eprintln!("failed to open and read `{}`: {}", path.display(), e);
                        summary.failed_sources.push(source.name());
                        continue;
                    }
                },
            };

            let (read, emitted) = match result {
                Ok(counts) => counts,
                Err(ScanError::Write(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    summary.output_closed = true;
                    break;
                }
                Err(ScanError::Write(e)) => return Err(e),
                Err(ScanError::Read { read, emitted, error }) => {
                    tracing::error!(source = %source.name(), line = read + 1, "reading input errored: {error}");
                    eprintln!("reading input errored in `{}`: {}", source.name(), error);
                    summary.failed_sources.push(source.name());
                    (read, emitted)
                }
            };

            summary.lines_read += read;
            summary.lines_emitted += emitted;
        }

        tracing::info!(
            lines_read = summary.lines_read,
            lines_emitted = summary.lines_emitted,
            failed_sources = summary.failed_sources.len(),
            "done"
        );
        Ok(summary)
    }

    /// Tells read errors (source is bad) from write errors (output is bad).
    ///
    /// Lines that are not valid UTF-8 are decoded lossily (`U+FFFD`) and
    /// still processed.
    fn scan_tracked<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        out: &mut W,
    ) -> Result<(usize, usize), ScanError> {
        let mut read = 0;
        let mut emitted = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|error| ScanError::Read {
                    read,
                    emitted,
                    error,
                })?;
            if n == 0 {
                break;
            }
            read += 1;

            let line = strip_line_ending(&buf);
            let line = String::from_utf8_lossy(line);
            if let Cow::Owned(_) = line {
                tracing::debug!(line = read, "invalid UTF-8 replaced");
            }

            if let Some(projected) = self.process_line(&line) {
                out.write_all(projected.as_bytes())
                    .and_then(|_| out.write_all(b"\n"))
                    .map_err(ScanError::Write)?;
                emitted += 1;
            }
        }

        out.flush().map_err(ScanError::Write)?;
        Ok((read, emitted))
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[derive(Debug)]
enum ScanError {
    Read {
        read: usize,
        emitted: usize,
        error: io::Error,
    },
    Write(io::Error),
}

fn open(path: &Path) -> io::Result<BufReader<File>> {
    File::open(path).map(BufReader::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn options() -> LltsvOptions {
        LltsvOptions::default()
    }

    fn run(lltsv: &Lltsv, input: &str) -> String {
        let mut out = Vec::new();
        lltsv.scan_and_write(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_pass_through() {
        let lltsv = Lltsv::new(&options(), false).unwrap();
        let input = "foo:aaa\tbar:bbb\nbaz:ccc\n";
        assert_eq!(run(&lltsv, input), input);
    }

    #[test]
    fn test_keys_and_no_key() {
        let lltsv = Lltsv::new(
            &LltsvOptions {
                keys: vec!["bar".into(), "foo".into()],
                no_key: true,
                ..options()
            },
            true,
        )
        .unwrap();
        assert_eq!(run(&lltsv, "foo:aaa\tbar:bbb\n"), "bbb\taaa\n");
    }

    #[test]
    fn test_expression_feeds_filter() {
        let lltsv = Lltsv::new(
            &LltsvOptions {
                keys: vec!["uri".into(), "diff".into()],
                exprs: vec!["diff = resptime - upstream_resptime".into()],
                filters: vec!["diff >= 2".into()],
                ..options()
            },
            false,
        )
        .unwrap();
        let input = "uri:/a\tresptime:5\tupstream_resptime:3\n\
                     uri:/b\tresptime:5\tupstream_resptime:4\n\
                     uri:/c\tresptime:x\tupstream_resptime:4\n";
        assert_eq!(run(&lltsv, input), "uri:/a\tdiff:2\n");
    }

    #[test]
    fn test_filters_and_time_ranges_are_anded() {
        let lltsv = Lltsv::new(
            &LltsvOptions {
                keys: vec!["status".into()],
                filters: vec!["status == 200".into()],
                timegreps: vec![
                    "time=2018-01-01T00:00:00+0900~2018-01-31T23:59:59+0900,iso8601".into(),
                ],
                ..options()
            },
            false,
        )
        .unwrap();
        let input = "status:200\ttime:2018-01-15T00:00:00+0900\n\
                     status:500\ttime:2018-01-15T00:00:00+0900\n\
                     status:200\ttime:2018-02-15T00:00:00+0900\n";
        assert_eq!(run(&lltsv, input), "status:200\n");
    }

    #[test]
    fn test_bad_filter_fails_construction() {
        let result = Lltsv::new(
            &LltsvOptions {
                filters: vec!["resptime".into()],
                ..options()
            },
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_crlf_is_stripped() {
        let lltsv = Lltsv::new(&options(), false).unwrap();
        assert_eq!(run(&lltsv, "a:1\r\nb:2\r\n"), "a:1\nb:2\n");
    }

    #[test]
    fn test_missing_file_is_recorded_and_others_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.log");
        std::fs::write(&good, "a:1\n").unwrap();
        let missing = dir.path().join("missing.log");

        let lltsv = Lltsv::new(&options(), false).unwrap();
        let mut out = Vec::new();
        let summary = lltsv
            .run_sources(&[Source::File(missing), Source::File(good)], &mut out)
            .unwrap();

        assert!(!summary.success());
        assert_eq!(summary.failed_sources.len(), 1);
        assert_eq!(summary.lines_read, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "a:1\n");
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_the_source() {
        let lltsv = Lltsv::new(&options(), false).unwrap();
        let mut out = Vec::new();
        let counts = lltsv
            .scan_and_write(&b"a:1\nua:caf\xe9\na:3\n"[..], &mut out)
            .unwrap();

        assert_eq!(counts, (3, 3));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a:1\nua:caf\u{fffd}\na:3\n"
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let lltsv = Lltsv::new(&options(), false).unwrap();
        assert_eq!(run(&lltsv, "a:1\nb:2\r"), "a:1\nb:2\n");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk gone"))
        }
    }

    #[test]
    fn test_read_error_keeps_earlier_lines() {
        let lltsv = Lltsv::new(&options(), false).unwrap();
        let reader = BufReader::new(Cursor::new(b"a:1\nb:2\n".to_vec()).chain(FailingReader));
        let mut out = Vec::new();

        let result = lltsv.scan_tracked(reader, &mut out);

        match result {
            Err(ScanError::Read { read, emitted, error }) => {
                assert_eq!((read, emitted), (2, 2));
                assert_eq!(error.to_string(), "disk gone");
            }
            other => panic!("expected a read error, got {other:?}"),
        }
        assert_eq!(String::from_utf8(out).unwrap(), "a:1\nb:2\n");
    }
}
