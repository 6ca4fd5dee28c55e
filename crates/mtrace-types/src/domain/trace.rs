use super::{ThreadRecord, TracePoint, VmInfo};

/// Everything a record source produced for one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTrace {
    pub vm: VmInfo,
    /// Threads in order of first appearance
    pub threads: Vec<DecodedThread>,
    pub stats: DecodeStats,
}

/// One thread and its points in decode order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedThread {
    pub thread: ThreadRecord,
    pub points: Vec<TracePoint>,
}

/// Counters reported after a decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub records: u64,
    pub bytes: u64,
    pub corrupt_blocks: u64,
}

impl DecodedTrace {
    pub fn new(vm: VmInfo) -> Self {
        Self {
            vm,
            ..Self::default()
        }
    }

    pub fn point_count(&self) -> usize {
        self.threads.iter().map(|t| t.points.len()).sum()
    }

    /// Thread entry for `record.id`, registering it on first sight.
    pub fn thread_mut(&mut self, record: ThreadRecord) -> &mut DecodedThread {
        let index = match self.threads.iter().position(|t| t.thread.id == record.id) {
            Some(index) => index,
            None => {
                self.threads.push(DecodedThread {
                    thread: record,
                    points: Vec::new(),
                });
                self.threads.len() - 1
            }
        };
        &mut self.threads[index]
    }

    /// Append a point to its owning thread, creating an anonymous thread
    /// record when the decoder never described it.
    pub fn push_point(&mut self, point: TracePoint) {
        let record = ThreadRecord {
            id: point.thread_id,
            native_id: 0,
            name: String::new(),
        };
        self.thread_mut(record).points.push(point);
    }
}
