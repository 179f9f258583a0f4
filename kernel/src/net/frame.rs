/// Frame chains — one Ethernet frame as an ordered list of memory
/// segments.
///
/// The stack's buffer pool hands out fixed-size segments, so a frame
/// larger than one segment arrives as a chain whose concatenation is the
/// logical frame. The driver fills chains on receive and reads them
/// (without mutating) on transmit.
use alloc::vec;
use alloc::vec::Vec;

pub struct FrameChain {
    segments: Vec<Vec<u8>>,
    total_len: usize,
}

impl FrameChain {
    /// Chain with the given per-segment lengths, zero-filled.
    pub fn with_segments(lens: &[usize]) -> Self {
        let segments: Vec<Vec<u8>> = lens.iter().map(|&l| vec![0u8; l]).collect();
        let total_len = lens.iter().sum();
        Self {
            segments,
            total_len,
        }
    }

    /// Chain of `len` bytes split into segments of at most `seg_size`.
    pub fn chunked(len: usize, seg_size: usize) -> Self {
        assert!(seg_size > 0, "segment size must be positive");
        let mut lens = Vec::new();
        let mut rest = len;
        while rest > seg_size {
            lens.push(seg_size);
            rest -= seg_size;
        }
        lens.push(rest);
        Self::with_segments(&lens)
    }

    /// Single-segment chain holding a copy of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            segments: vec![data.to_vec()],
            total_len: data.len(),
        }
    }

    /// Total frame length across all segments.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// Copy `src` into the chain starting at byte `offset`, crossing
    /// segment boundaries in order.
    pub fn write_at(&mut self, offset: usize, src: &[u8]) {
        assert!(offset + src.len() <= self.total_len, "write past end of chain");
        let mut skip = offset;
        let mut src = src;
        for seg in self.segments.iter_mut() {
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let room = seg.len() - skip;
            let n = room.min(src.len());
            seg[skip..skip + n].copy_from_slice(&src[..n]);
            src = &src[n..];
            skip = 0;
            if src.is_empty() {
                break;
            }
        }
    }

    /// Copy chain bytes starting at `offset` into `dst`, in segment
    /// order. Returns the number of bytes copied.
    pub fn copy_to(&self, offset: usize, dst: &mut [u8]) -> usize {
        let mut skip = offset;
        let mut copied = 0;
        for seg in self.segments.iter() {
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let avail = seg.len() - skip;
            let n = avail.min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&seg[skip..skip + n]);
            copied += n;
            skip = 0;
            if copied == dst.len() {
                break;
            }
        }
        copied
    }
}
