use crate::field::{Channels, Field, GridSize};

/// Double-buffered field: two equally sized stores with swappable roles.
///
/// Kernels sample `read` and render into `write`; `swap` flips which slot is
/// authoritative without touching the data.
#[derive(Clone, Debug)]
pub struct GridBuffer {
    slots: [Field; 2],
    read: usize,
}

impl GridBuffer {
    pub fn new(size: GridSize, channels: Channels) -> Self {
        Self {
            slots: [Field::new(size, channels), Field::new(size, channels)],
            read: 0,
        }
    }

    pub fn size(&self) -> GridSize {
        self.slots[0].size()
    }

    pub fn channels(&self) -> Channels {
        self.slots[0].channels()
    }

    /// Index of the slot currently playing the `read` role.
    pub fn read_slot(&self) -> usize {
        self.read
    }

    pub fn read(&self) -> &Field {
        &self.slots[self.read]
    }

    pub fn write(&self) -> &Field {
        &self.slots[self.read ^ 1]
    }

    pub fn read_mut(&mut self) -> &mut Field {
        &mut self.slots[self.read]
    }

    pub fn write_mut(&mut self) -> &mut Field {
        &mut self.slots[self.read ^ 1]
    }

    /// Borrow `read` for sampling and `write` for output at the same time.
    pub fn split(&mut self) -> (&Field, &mut Field) {
        let (first, second) = self.slots.split_at_mut(1);
        if self.read == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    /// Exchange the read and write roles. O(1), no data is copied.
    pub fn swap(&mut self) {
        self.read ^= 1;
    }

    /// Reallocate both stores at `size`, zero-filled. Prior contents are lost.
    pub fn resize(&mut self, size: GridSize) {
        let channels = self.channels();
        self.slots = [Field::new(size, channels), Field::new(size, channels)];
        self.read = 0;
    }

    /// Zero both stores without reallocating.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }
}
