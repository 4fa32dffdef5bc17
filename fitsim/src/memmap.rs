//! The address space, modelled as a doubly-linked list of [Segment]s
//! living inside an arena.
//!
//! Segments are addressed through [SegmentId] handles. A handle carries
//! the generation of the slot it points to, so that a handle to a
//! segment destroyed by a merge can never be mistaken for whatever
//! segment reuses the slot later on.
//!
//! Every public mutation leaves the map in a state where:
//! 1. segments are sorted by start offset and pairwise contiguous,
//! 2. the first one starts at 0 and the last one ends at [MemoryMap::total],
//! 3. no segment has zero length,
//! 4. no two neighboring segments are both holes.
use crate::helpe::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId {
    slot:   u32,
    gen:    u32,
}

#[derive(Debug, Clone)]
struct Node {
    seg:    Segment,
    prev:   Option<SegmentId>,
    next:   Option<SegmentId>,
}

#[derive(Debug, Clone)]
struct Slot {
    gen:    u32,
    node:   Option<Node>,
}

#[derive(Debug, Clone)]
pub struct MemoryMap {
    slots:  Vec<Slot>,
    // Slots whose node has been destroyed, up for grabs.
    vacant: Vec<u32>,
    head:   SegmentId,
    total:  Units,
    count:  usize,
}

/// Forward traversal of a [MemoryMap], starting from some handle
/// and ending at the last segment. A stale starting handle yields
/// nothing at all.
#[derive(Clone)]
pub struct Walk<'a> {
    map:    &'a MemoryMap,
    cursor: Option<SegmentId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.map.node(id)?;
        self.cursor = node.next;

        Some((id, &node.seg))
    }
}

impl MemoryMap {
    /// Creates a map made of a single hole, `[0, total)`.
    pub fn new(total: Units) -> Result<Self, MapError> {
        let mut res = Self {
            slots:  vec![],
            vacant: vec![],
            head:   SegmentId { slot: 0, gen: 0 },
            total:  0,
            count:  0,
        };
        res.initialize(total)?;

        Ok(res)
    }

    /// Throws away everything and starts over with one big hole.
    /// Handles given out before this call are all invalidated.
    pub fn initialize(&mut self, total: Units) -> Result<(), MapError> {
        if total == 0 {
            return Err(MapError::ZeroSize);
        }
        // Bump generations instead of clearing, so that
        // old handles stay stale.
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.gen = slot.gen.wrapping_add(1);
                self.vacant.push(idx as u32);
            }
        }
        self.count = 0;
        self.total = total;
        self.head = self.alloc(Node {
            seg:    Segment { occupant: Occupant::Hole, start: 0, len: total },
            prev:   None,
            next:   None,
        });
        debug_assert!(self.check().is_ok(), "Bad initialization!");

        Ok(())
    }

    #[inline(always)]
    pub fn head(&self) -> SegmentId {
        self.head
    }

    #[inline(always)]
    pub fn total(&self) -> Units {
        self.total
    }

    /// Number of segments, holes included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.node(id).map(|n| &n.seg)
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.node(id).is_some()
    }

    pub fn walk(&self, from: SegmentId) -> Walk<'_> {
        Walk {
            map:    self,
            cursor: Some(from),
        }
    }

    /// All segments in address order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.walk(self.head).map(|(_, s)| s)
    }

    /// An owned copy of the segment list, as handed to reporters.
    pub fn snapshot(&self) -> Vec<Segment> {
        self.segments().copied().collect()
    }

    /// The scanning primitive behind every placement strategy: lazily
    /// yields, in list order, the handles of the segments at or after
    /// `from` that satisfy `pred`.
    pub fn find<'a, P>(&'a self, from: SegmentId, pred: P) -> impl Iterator<Item = SegmentId> + 'a
    where P: Fn(&Segment) -> bool + 'a {
        self.walk(from)
            .filter(move |(_, s)| pred(s))
            .map(|(id, _)| id)
    }

    /// Carves `size` units out of the front of `hole` and hands them
    /// to `pid`. Whatever is left of the hole stays a hole right after
    /// the new segment; nothing is left behind on an exact fit.
    ///
    /// The returned handle is the one that used to address the hole.
    pub fn insert(&mut self, hole: SegmentId, size: Units, pid: Pid) -> Result<SegmentId, MapError> {
        if size == 0 {
            return Err(MapError::ZeroRequest);
        }
        let node = self.node_mut(hole).ok_or(MapError::StaleHandle(hole))?;
        match node.seg.occupant {
            Occupant::Process(other) => {
                return Err(MapError::NotAHole { start: node.seg.start, pid: other });
            },
            Occupant::Hole if node.seg.len < size => {
                return Err(MapError::HoleTooSmall {
                    start:  node.seg.start,
                    len:    node.seg.len,
                    wanted: size,
                });
            },
            Occupant::Hole => {},
        }
        let remainder = node.seg.len - size;
        let old_next = node.next;
        node.seg.occupant = Occupant::Process(pid);
        node.seg.len = size;
        if remainder > 0 {
            let start = node.seg.end();
            let rest = self.alloc(Node {
                seg:    Segment { occupant: Occupant::Hole, start, len: remainder },
                prev:   Some(hole),
                next:   old_next,
            });
            if let Some(n) = self.node_mut(hole) { n.next = Some(rest); }
            if let Some(n) = old_next.and_then(|id| self.node_mut(id)) { n.prev = Some(rest); }
        }
        debug_assert!(self.check().is_ok(), "Bad insertion!");

        Ok(hole)
    }

    /// Gives the memory of `pid` back, merging it with any neighboring
    /// holes. Returns the handle of the (possibly merged) hole.
    pub fn release(&mut self, pid: Pid) -> Result<SegmentId, MapError> {
        let me = self.find(self.head, move |s| s.occupant == Occupant::Process(pid))
            .next()
            .ok_or(MapError::NoSuchOccupant(pid))?;
        let (prev, next) = {
            let node = self.node_mut(me).ok_or(MapError::StaleHandle(me))?;
            node.seg.occupant = Occupant::Hole;
            (node.prev, node.next)
        };
        let left = prev.filter(|&id| self.is_hole(id));
        let right = next.filter(|&id| self.is_hole(id));
        let res = match (left, right) {
            (Some(l), Some(_))  => {
                trace!("P{pid}: merging both neighbors");
                self.absorb_next(l);
                self.absorb_next(l);
                l
            },
            (Some(l), None)     => {
                trace!("P{pid}: merging into left neighbor");
                self.absorb_next(l);
                l
            },
            (None, Some(r))     => {
                trace!("P{pid}: merging into right neighbor");
                self.absorb_into_next(me);
                r
            },
            (None, None)        => me,
        };
        debug_assert!(self.check().is_ok(), "Bad release!");

        Ok(res)
    }

    /// Verifies every structural invariant of the map, describing
    /// the first violation found.
    pub fn check(&self) -> Result<(), String> {
        match self.node(self.head) {
            None                                => { return Err(String::from("Head is stale!")); },
            Some(n) if n.prev.is_some()         => { return Err(String::from("Head has a predecessor!")); },
            _                                   => {},
        }
        let mut expected_start = 0;
        let mut seen = 0;
        let mut last: Option<(SegmentId, Segment)> = None;
        for (id, seg) in self.walk(self.head) {
            seen += 1;
            if seen > self.count {
                return Err(String::from("Segment list is cyclic!"));
            }
            if seg.len == 0 {
                return Err(format!("Zero-length segment at {}", seg.start));
            }
            if seg.start != expected_start {
                return Err(format!("Segment starts at {}, expected {}", seg.start, expected_start));
            }
            if let Some((last_id, last_seg)) = last {
                if last_seg.is_hole() && seg.is_hole() {
                    return Err(format!("Unmerged holes at {} and {}", last_seg.start, seg.start));
                }
                if self.node(id).and_then(|n| n.prev) != Some(last_id) {
                    return Err(format!("Broken back-link at {}", seg.start));
                }
            }
            expected_start = seg.end();
            last = Some((id, *seg));
        }
        if expected_start != self.total {
            return Err(format!("Segments cover {} units out of {}", expected_start, self.total));
        }
        if seen != self.count {
            return Err(format!("{} segments reachable, {} alive", seen, self.count));
        }

        Ok(())
    }

    //---START ARENA PLUMBING
    fn node(&self, id: SegmentId) -> Option<&Node> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.gen == id.gen)
            .and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, id: SegmentId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.gen == id.gen)
            .and_then(|s| s.node.as_mut())
    }

    fn is_hole(&self, id: SegmentId) -> bool {
        self.get(id).is_some_and(|s| s.is_hole())
    }

    fn alloc(&mut self, node: Node) -> SegmentId {
        self.count += 1;
        if let Some(slot) = self.vacant.pop() {
            let target = &mut self.slots[slot as usize];
            target.node = Some(node);
            SegmentId { slot, gen: target.gen }
        } else {
            self.slots.push(Slot { gen: 0, node: Some(node) });
            SegmentId { slot: (self.slots.len() - 1) as u32, gen: 0 }
        }
    }

    /// Destroys a node without touching its neighbors' links.
    fn destroy(&mut self, id: SegmentId) -> Option<Node> {
        let slot = self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.gen == id.gen)?;
        let node = slot.node.take()?;
        slot.gen = slot.gen.wrapping_add(1);
        self.vacant.push(id.slot);
        self.count -= 1;

        Some(node)
    }

    /// `keep` swallows its successor.
    fn absorb_next(&mut self, keep: SegmentId) {
        let Some(gone) = self.node(keep).and_then(|n| n.next) else { return; };
        let Some(dead) = self.destroy(gone) else { return; };
        if let Some(n) = self.node_mut(keep) {
            n.seg.len += dead.seg.len;
            n.next = dead.next;
        }
        if let Some(n) = dead.next.and_then(|id| self.node_mut(id)) { n.prev = Some(keep); }
    }

    /// `gone`'s successor grows to the left and swallows it.
    fn absorb_into_next(&mut self, gone: SegmentId) {
        let Some(keep) = self.node(gone).and_then(|n| n.next) else { return; };
        let Some(dead) = self.destroy(gone) else { return; };
        if let Some(n) = self.node_mut(keep) {
            n.seg.start = dead.seg.start;
            n.seg.len += dead.seg.len;
            n.prev = dead.prev;
        }
        match dead.prev.and_then(|id| self.node_mut(id)) {
            Some(n) => { n.next = Some(keep); },
            None    => { self.head = keep; },
        }
    }
    //---END ARENA PLUMBING
}
