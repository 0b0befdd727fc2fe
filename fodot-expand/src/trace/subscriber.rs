use serde_derive::Serialize;
use std::{
    fmt,
    fs::File,
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use tracing::*;

/// Thread safe json logger that writes one [`SearchRecord`] per search event into a given log
/// file. The first failed write is reported on standard error; later records are still
/// attempted.
pub struct JsonLogger<W: Write = File> {
    log_file: Mutex<W>,
    failed: AtomicBool,
}

impl<W: Write> JsonLogger<W> {
    pub fn new(log_file: W) -> Self {
        Self {
            log_file: Mutex::new(log_file),
            failed: AtomicBool::new(false),
        }
    }

    /// Returns true if a record could not be written.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    fn write(&self, record: &SearchRecord) {
        let result = serde_json::to_string_pretty(record)
            .map_err(io::Error::from)
            .and_then(|json| {
                let mut file = self
                    .log_file
                    .lock()
                    .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
                writeln!(file, "{}", json)
            });
        if let Err(err) = result {
            if !self.failed.swap(true, Ordering::Relaxed) {
                eprintln!("unable to write the search log: {}", err);
            }
        }
    }
}

impl<W: Write + Send + 'static> subscriber::Subscriber for JsonLogger<W> {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn new_span(&self, _: &span::Attributes) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &span::Record) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);

        if let Some(event_type) = &recorder.event {
            match event_type.as_str() {
                super::DECIDE | super::CONFLICT | super::MODEL | super::EXHAUSTED
                | super::STOPPED => self.write(&SearchRecord::from(recorder)),
                _ => (),
            }
        }
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// A record of a search event: a decision, a conflict, a model, or the end of the search.
#[derive(Serialize, PartialEq, Debug)]
struct SearchRecord {
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    var: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decisions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    models: Option<u64>,
}

impl From<Recorder> for SearchRecord {
    fn from(value: Recorder) -> Self {
        Self {
            event: value.event.unwrap_or_default(),
            var: value.var,
            value: value.value,
            depth: value.depth,
            model_id: value.model_id,
            model: value.model,
            reason: value.reason,
            decisions: value.decisions,
            conflicts: value.conflicts,
            models: value.models,
        }
    }
}

/// Generic trace visitor to collect as many fields as it can. Based on the triggering event,
/// `Recorder` is converted to a [`SearchRecord`].
#[derive(Default)]
struct Recorder {
    event: Option<String>,
    var: Option<String>,
    value: Option<i64>,
    depth: Option<u64>,
    model_id: Option<u64>,
    model: Option<String>,
    reason: Option<String>,
    decisions: Option<u64>,
    conflicts: Option<u64>,
    models: Option<u64>,
}

impl field::Visit for Recorder {
    fn record_i64(&mut self, field: &field::Field, value: i64) {
        if field.name() == super::VALUE_FIELD {
            self.value = Some(value);
        }
    }

    fn record_u64(&mut self, field: &field::Field, value: u64) {
        match field.name() {
            super::DEPTH_FIELD => self.depth = Some(value),
            super::MODEL_ID_FIELD => self.model_id = Some(value),
            super::DECISIONS_FIELD => self.decisions = Some(value),
            super::CONFLICTS_FIELD => self.conflicts = Some(value),
            super::MODELS_FIELD => self.models = Some(value),
            _ => (),
        }
    }

    fn record_str(&mut self, field: &field::Field, value: &str) {
        match field.name() {
            super::EVENT_FIELD => self.event = Some(value.to_owned()),
            super::VAR_FIELD => self.var = Some(value.to_owned()),
            _ => (),
        }
    }

    fn record_debug(&mut self, field: &field::Field, value: &dyn fmt::Debug) {
        match field.name() {
            super::MODEL_FIELD => self.model = Some(format!("{:?}", value)),
            super::REASON_FIELD => self.reason = Some(format!("{:?}", value)),
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{solver::{Mode, Solver}, test_prelude::*};
    use std::io::Read;

    #[test]
    fn test_json_logger() {
        let path = std::env::temp_dir().join(format!("fodot-trace-{}.json", std::process::id()));
        let file = File::create(&path).unwrap();
        let logger = JsonLogger::new(file);
        let problem = grounded("vocabulary { p. q. } theory { p | q. }");
        let count = tracing::subscriber::with_default(logger, || {
            Solver::new(Mode::AllModels).solve(&problem).outcome.models().len()
        });
        assert_eq!(3, count);

        let mut log = String::new();
        File::open(&path).unwrap().read_to_string(&mut log).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(3, log.matches("\"event\": \"@model\"").count());
        assert_eq!(1, log.matches("\"event\": \"@exhausted\"").count());
        assert!(log.contains("\"var\": \"p\""));
        assert!(log.contains("\"model_id\": 3"));
    }

    struct Full(usize);

    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            self.0 += 1;
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write() {
        let logger = JsonLogger::new(Full(0));
        assert!(!logger.failed());
        let record = SearchRecord::from(Recorder {
            event: Some(crate::trace::MODEL.to_owned()),
            ..Recorder::default()
        });
        logger.write(&record);
        logger.write(&record);
        assert!(logger.failed());
        assert_eq!(2, logger.log_file.lock().unwrap().0);
    }
}
