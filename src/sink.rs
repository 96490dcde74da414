//! Destinations for access-log lines.

use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Something that accepts finished log lines.
///
/// One [`Logger`](crate::middleware::Logger) serves many requests at once, so
/// a sink is shared across threads and must keep concurrent lines from
/// interleaving. Each call carries exactly one newline-terminated line.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &[u8]) -> io::Result<()>;
}

impl LogSink for io::Stdout {
    fn append(&self, line: &[u8]) -> io::Result<()> {
        self.lock().write_all(line)
    }
}

impl LogSink for io::Stderr {
    fn append(&self, line: &[u8]) -> io::Result<()> {
        self.lock().write_all(line)
    }
}

/// A file opened in append mode receives each line in a single `write`, which
/// the OS keeps whole.
impl LogSink for File {
    fn append(&self, line: &[u8]) -> io::Result<()> {
        (&*self).write_all(line)
    }
}

impl<W: Write + Send> LogSink for Mutex<W> {
    fn append(&self, line: &[u8]) -> io::Result<()> {
        self.lock()
            .map_err(|_| io::Error::other("log sink mutex poisoned"))?
            .write_all(line)
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn append(&self, line: &[u8]) -> io::Result<()> {
        (**self).append(line)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn mutex_sink_keeps_lines_whole() {
        let sink = Arc::new(Mutex::new(Vec::new()));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.append(format!("worker-{i} done\n").as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let out = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
        assert_eq!(out.lines().count(), 400);
        assert!(out.lines().all(|l| l.starts_with("worker-") && l.ends_with(" done")));
    }

    #[test]
    fn poisoned_mutex_is_an_io_error() {
        let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
        let poison = Arc::clone(&sink);
        let _ = thread::spawn(move || {
            let _guard = poison.lock().unwrap();
            panic!("poison the sink");
        })
        .join();

        assert!(sink.append(b"line\n").is_err());
    }
}
