//! Decoded trace fixtures.
//!
//! Points get increasing tp ids and raw times in the order they are added,
//! and land on their thread in that order, which is the order an import
//! persists them.

use mtrace_types::{
    COMPONENT_AUX_TRACE, COMPONENT_METHOD_TRACE, DecodedTrace, PointType, ThreadRecord,
    TracePoint, VmInfo,
};

/// Fluent builder for [`DecodedTrace`] values.
///
/// # Example
/// ```
/// use mtrace_testing::TraceBuilder;
///
/// let trace = TraceBuilder::new()
///     .thread(1, 100, "main")
///     .entry(1, "A", "foo", "()V")
///     .exit(1, "A", "foo", "()V")
///     .build();
/// assert_eq!(trace.point_count(), 2);
/// ```
pub struct TraceBuilder {
    trace: DecodedTrace,
    next_tp: i64,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self {
            trace: DecodedTrace::new(VmInfo {
                version: "JRE 1.8.0 Linux amd64-64 (build 8.0.7.0)".to_string(),
                summary: "Trace file header\nJVM start time: 2024-03-01 10:00:00".to_string(),
            }),
            next_tp: 1,
        }
    }

    pub fn vm(mut self, version: &str, summary: &str) -> Self {
        self.trace.vm = VmInfo {
            version: version.to_string(),
            summary: summary.to_string(),
        };
        self
    }

    /// Describe a thread; points added before this keep their thread entry.
    pub fn thread(mut self, id: i64, native_id: i64, name: &str) -> Self {
        let record = ThreadRecord {
            id,
            native_id,
            name: name.to_string(),
        };
        let key = record.clone();
        self.trace.thread_mut(key).thread = record;
        self
    }

    pub fn entry(self, thread_id: i64, class: &str, method: &str, signature: &str) -> Self {
        let text = format!(">{}.{}{} bytecode method", class, method, signature);
        self.method_point(thread_id, PointType::Entry, class, method, signature, text)
    }

    pub fn exit(self, thread_id: i64, class: &str, method: &str, signature: &str) -> Self {
        let text = format!("<{}.{}{} bytecode method", class, method, signature);
        self.method_point(thread_id, PointType::Exit, class, method, signature, text)
    }

    /// Exit whose formatted text carries the exception marker.
    pub fn exception_exit(self, thread_id: i64, class: &str, method: &str, signature: &str) -> Self {
        let text = format!("*{}.{}{} by exception", class, method, signature);
        self.method_point(thread_id, PointType::Exit, class, method, signature, text)
    }

    /// Auxiliary stack-trace line.
    pub fn aux(self, thread_id: i64, text: &str) -> Self {
        self.point(thread_id, COMPONENT_AUX_TRACE, PointType::Event, text, Vec::new())
    }

    /// A point of some other component, ignored by reconstruction.
    pub fn event(self, thread_id: i64, component: &str, text: &str) -> Self {
        self.point(thread_id, component, PointType::Event, text, vec![text.to_string()])
    }

    /// `depth` nested calls on one thread, unwound in order.
    pub fn nested(mut self, thread_id: i64, class: &str, depth: usize) -> Self {
        for level in 0..depth {
            self = self.entry(thread_id, class, &format!("level{}", level), "()V");
        }
        for level in (0..depth).rev() {
            self = self.exit(thread_id, class, &format!("level{}", level), "()V");
        }
        self
    }

    pub fn build(self) -> DecodedTrace {
        self.trace
    }

    fn method_point(
        self,
        thread_id: i64,
        kind: PointType,
        class: &str,
        method: &str,
        signature: &str,
        text: String,
    ) -> Self {
        let parameters = vec![class.to_string(), method.to_string(), signature.to_string()];
        self.point(thread_id, COMPONENT_METHOD_TRACE, kind, &text, parameters)
    }

    fn point(
        mut self,
        thread_id: i64,
        component: &str,
        kind: PointType,
        text: &str,
        parameters: Vec<String>,
    ) -> Self {
        let tp_id = self.next_tp;
        self.next_tp += 1;
        self.trace.push_point(TracePoint {
            tp_id,
            component: component.to_string(),
            container_component: "j9vm".to_string(),
            debug_info: String::new(),
            formatted_parameters: text.to_string(),
            parameters,
            formatted_time: format!("10:00:00.{:09}", tp_id),
            raw_time: 1_000 * tp_id,
            groups: vec![component.to_string()],
            kind,
            thread_id,
        });
        self
    }
}

/// Two threads: `main` calls `App.run -> Dao.load`, a worker throws out of
/// `Job.exec` and leaves `Job.cleanup` open.
pub fn sample_trace() -> DecodedTrace {
    TraceBuilder::new()
        .thread(1, 9001, "main")
        .thread(2, 9002, "worker-1")
        .entry(1, "App", "run", "([Ljava/lang/String;)V")
        .entry(1, "Dao", "load", "(I)Ljava/lang/Object;")
        .entry(2, "Job", "exec", "()V")
        .exit(1, "Dao", "load", "(I)Ljava/lang/Object;")
        .aux(2, "at Job.exec(Job.java:12)")
        .exception_exit(2, "Job", "exec", "()V")
        .entry(2, "Job", "cleanup", "()V")
        .event(1, "j9vm", "GC start")
        .exit(1, "App", "run", "([Ljava/lang/String;)V")
        .build()
}
