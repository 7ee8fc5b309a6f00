use log::{debug, info};
use std::collections::VecDeque;
use std::io;
use std::time::Instant;

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::error::BlockError;
use crate::map::address::{block_offset, BlockAddress};
use crate::map::block::MapBlock;
use crate::map::geometry::{BBox, Point32};
use crate::map::parser::{parse_block, ParseLimits};
use crate::map::source::BlockSource;

/// Block offsets covering the corners of `bbox`, first occurrence kept
pub fn resolve(bbox: &BBox) -> Vec<Point32> {
    let mut offsets: Vec<Point32> = Vec::with_capacity(4);
    for corner in bbox.corners() {
        let offset = block_offset(corner);
        if !offsets.contains(&offset) {
            offsets.push(offset);
        }
    }
    offsets
}

/// Fixed-capacity pool of parsed blocks, kept in insertion order. Eviction
/// drops the oldest-inserted block whether or not it is in view.
pub struct BlockCache<S> {
    source: S,
    blocks: VecDeque<MapBlock>,
    capacity: usize,
    limits: ParseLimits,
}

impl<S: BlockSource> BlockCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_CACHE_CAPACITY)
    }

    /// Pool holding at most `capacity` blocks (at least one)
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            blocks: VecDeque::with_capacity(capacity),
            capacity,
            limits: ParseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resident blocks, oldest first
    pub fn blocks(&self) -> impl Iterator<Item = &MapBlock> {
        self.blocks.iter()
    }

    pub fn get(&self, offset: Point32) -> Option<&MapBlock> {
        self.blocks.iter().find(|b| b.offset == offset)
    }

    pub fn contains(&self, offset: Point32) -> bool {
        self.get(offset).is_some()
    }

    /// Drop every resident block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Mark every resident block as out of view
    pub fn reset_view(&mut self) {
        for block in &mut self.blocks {
            block.in_view = false;
        }
    }

    /// Make the block at `offset` resident and in view.
    ///
    /// On a miss with a full pool the oldest-inserted block is evicted
    /// before the new one is read, so at most `capacity` parsed blocks are
    /// ever held. The eviction stands even if the read then fails.
    pub fn ensure_loaded(&mut self, offset: Point32) -> Result<&MapBlock, BlockError> {
        let offset = block_offset(offset);
        if let Some(idx) = self.blocks.iter().position(|b| b.offset == offset) {
            let block = &mut self.blocks[idx];
            block.in_view = true;
            return Ok(block);
        }

        if self.blocks.len() >= self.capacity {
            if let Some(evicted) = self.blocks.pop_front() {
                debug!(
                    "evicted block ({}, {}) with {} points",
                    evicted.offset.x,
                    evicted.offset.y,
                    evicted.point_count()
                );
            }
        }

        let mut block = self.load(&BlockAddress::containing(offset))?;
        block.offset = offset;
        block.in_view = true;

        self.blocks.push_back(block);
        debug_assert!(self.blocks.len() <= self.capacity, "block cache over capacity");

        let last = self.blocks.len() - 1;
        Ok(&self.blocks[last])
    }

    fn load(&self, address: &BlockAddress) -> Result<MapBlock, BlockError> {
        let started = Instant::now();
        let reader = self.source.open(address).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BlockError::NotFound { key: address.key() },
            _ => BlockError::Io(e),
        })?;
        let block = parse_block(reader, self.limits)?;
        info!(
            "loaded block {} ({} points) in {:?}",
            address,
            block.point_count(),
            started.elapsed()
        );
        Ok(block)
    }
}
