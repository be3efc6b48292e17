//! Block descriptors and the index-linked list that orders them.
//!
//! ```text
//!   slots:  [ 0: used  ] [ 1: free ] [ 2: used  ] [ 3: vacant ]
//!
//!   list:   head ──▶ 0 ◀──▶ 2 ◀──▶ 1 ◀── tail
//!                 [0,200) [200,400) [400,1000)
//! ```
//!
//! Links are indices into `slots`, never addresses. A slot whose descriptor
//! was merged away goes on the vacant stack and is handed out again by the
//! next split.

pub(crate) type BlockId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
  pub offset: usize,
  pub size: usize,
  pub is_free: bool,
  pub prev: Option<BlockId>,
  pub next: Option<BlockId>,
}

impl Block {
  pub fn new(
    offset: usize,
    size: usize,
    is_free: bool,
  ) -> Self {
    Self {
      offset,
      size,
      is_free,
      prev: None,
      next: None,
    }
  }

  pub fn end(&self) -> usize {
    self.offset + self.size
  }
}

/// Public, read-only view of one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  pub offset: usize,
  pub size: usize,
  pub is_free: bool,
}

impl From<&Block> for BlockInfo {
  fn from(block: &Block) -> Self {
    Self {
      offset: block.offset,
      size: block.size,
      is_free: block.is_free,
    }
  }
}

pub(crate) struct BlockList {
  slots: Vec<Block>,
  vacant: Vec<BlockId>,
  head: BlockId,
  tail: BlockId,
  len: usize,
}

impl BlockList {
  /// A list holding one free descriptor spanning `[0, capacity)`.
  pub fn new(capacity: usize) -> Self {
    Self {
      slots: vec![Block::new(0, capacity, true)],
      vacant: Vec::new(),
      head: 0,
      tail: 0,
      len: 1,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn tail(&self) -> BlockId {
    self.tail
  }

  pub fn get(
    &self,
    id: BlockId,
  ) -> &Block {
    &self.slots[id]
  }

  pub fn get_mut(
    &mut self,
    id: BlockId,
  ) -> &mut Block {
    &mut self.slots[id]
  }

  /// Walks the live descriptors in address order.
  pub fn iter(&self) -> Iter<'_> {
    Iter {
      list: self,
      cursor: Some(self.head),
    }
  }

  pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
    let mut cursor = Some(self.head);
    std::iter::from_fn(move || {
      let id = cursor?;
      cursor = self.slots[id].next;
      Some(id)
    })
  }

  /// Links `block` immediately before `at` and returns its id.
  pub fn insert_before(
    &mut self,
    at: BlockId,
    mut block: Block,
  ) -> BlockId {
    let prev = self.slots[at].prev;
    block.prev = prev;
    block.next = Some(at);

    let id = match self.vacant.pop() {
      Some(id) => {
        self.slots[id] = block;
        id
      }
      None => {
        self.slots.push(block);
        self.slots.len() - 1
      }
    };

    self.slots[at].prev = Some(id);
    match prev {
      Some(prev) => self.slots[prev].next = Some(id),
      None => self.head = id,
    }

    self.len += 1;
    id
  }

  /// Unlinks `id` and recycles its slot. The list must keep at least one
  /// descriptor, so `id` may not be the only one.
  pub fn remove(
    &mut self,
    id: BlockId,
  ) -> Block {
    debug_assert!(self.len > 1, "cannot remove the last descriptor");

    let block = self.slots[id];

    match block.prev {
      Some(prev) => self.slots[prev].next = block.next,
      None => {
        if let Some(next) = block.next {
          self.head = next;
        }
      }
    }
    match block.next {
      Some(next) => self.slots[next].prev = block.prev,
      None => {
        if let Some(prev) = block.prev {
          self.tail = prev;
        }
      }
    }

    self.vacant.push(id);
    self.len -= 1;
    block
  }
}

pub(crate) struct Iter<'a> {
  list: &'a BlockList,
  cursor: Option<BlockId>,
}

impl<'a> Iterator for Iter<'a> {
  type Item = &'a Block;

  fn next(&mut self) -> Option<Self::Item> {
    let list = self.list;
    let block = &list.slots[self.cursor?];
    self.cursor = block.next;
    Some(block)
  }
}
