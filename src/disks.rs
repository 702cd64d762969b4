use crate::classify::ClassifiedLine;
use crate::metrics::{Disk, DiskSnapshot, Partition};
use crate::timestamp::Timestamp;
use tracing::debug;

/// Groups `disk:` and `partition:` lines into timestamp-delimited snapshots.
///
/// Two explicit cursors: the open snapshot and the index of the disk that
/// partitions currently attach to. A change of timestamp token closes the
/// open snapshot and emits it; the same policy serves the live path (where a
/// torn-down session simply drops the open snapshot) and the batch path
/// (which calls [`finish`](Self::finish) to flush the tail).
#[derive(Debug, Default)]
pub struct DiskSnapshotBuilder {
    current: Option<DiskSnapshot>,
    current_disk: Option<usize>,
}

impl DiskSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one classified line observed under `time`. Returns the snapshot
    /// closed by a timestamp boundary, if any.
    pub fn observe(&mut self, time: &Timestamp, line: &ClassifiedLine) -> Option<DiskSnapshot> {
        let closed = self.roll_over(time);

        match line {
            ClassifiedLine::Disk { name, size } => {
                let snapshot = self.open_snapshot(time);
                snapshot.disks.push(Disk {
                    name: name.clone(),
                    size: size.clone(),
                    partitions: Vec::new(),
                });
                let opened = snapshot.disks.len() - 1;
                self.current_disk = Some(opened);
            }
            ClassifiedLine::Partition(partition) => self.attach_partition(time, partition),
            _ => {}
        }

        closed
    }

    /// Force-closes the open snapshot. Batch parsing calls this after the
    /// last line; live sessions never do (no defined end of data).
    pub fn finish(&mut self) -> Option<DiskSnapshot> {
        self.current_disk = None;
        self.current.take()
    }

    fn roll_over(&mut self, time: &Timestamp) -> Option<DiskSnapshot> {
        match &self.current {
            Some(snapshot) if snapshot.timestamp != *time => {
                self.current_disk = None;
                self.current.take()
            }
            _ => None,
        }
    }

    fn open_snapshot(&mut self, time: &Timestamp) -> &mut DiskSnapshot {
        self.current.get_or_insert_with(|| DiskSnapshot {
            timestamp: time.clone(),
            disks: Vec::new(),
        })
    }

    fn attach_partition(&mut self, time: &Timestamp, partition: &Partition) {
        let current_disk = self.current_disk;
        let snapshot = self.open_snapshot(time);
        match current_disk.and_then(|i| snapshot.disks.get_mut(i)) {
            Some(disk) => disk.partitions.push(partition.clone()),
            None => {
                // Orphan partition: no disk opened in this snapshot yet.
                debug!(partition = %partition.name, "dropping partition with no open disk");
            }
        }
    }
}
