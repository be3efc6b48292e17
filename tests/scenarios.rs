//! The classic pool-of-1000 scenarios, driven through the
//! `create_pool` / `allocate` / `deallocate` / `destroy_pool` facade.

use rpool::{Address, BlockInfo, PoolAllocator, PoolError};

fn shape(allocator: &PoolAllocator) -> Vec<BlockInfo> {
  allocator.pool().unwrap().blocks().collect()
}

fn single_free_block(capacity: usize) -> Vec<BlockInfo> {
  vec![BlockInfo {
    offset: 0,
    size: capacity,
    is_free: true,
  }]
}

fn allocate_n(
  allocator: &mut PoolAllocator,
  count: usize,
  size: usize,
) -> Vec<Address> {
  (0..count)
    .map(|_| allocator.allocate(size).unwrap())
    .collect()
}

fn free_all(
  allocator: &mut PoolAllocator,
  addresses: &[Address],
) {
  for &address in addresses {
    allocator.deallocate(address).unwrap();
  }
}

#[test]
fn test_blocks_of_ten_exhaust_after_one_hundred() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();

  let mut count = 0;
  let err = loop {
    match allocator.allocate(10) {
      Ok(_) => count += 1,
      Err(err) => break err,
    }
  };

  assert_eq!(count, 100);
  assert!(matches!(
    err,
    PoolError::OutOfMemory {
      requested: 10,
      largest_free: 0
    }
  ));
  assert!(allocator.destroy_pool());
}

#[test]
fn test_reuse_after_free_all() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();
  let mut first_round = None;

  for _ in 0..5 {
    let blocks = allocate_n(&mut allocator, 5, 200);
    let offsets: Vec<_> = blocks.iter().map(Address::offset).collect();

    assert_eq!(offsets, vec![0, 200, 400, 600, 800]);
    assert_eq!(*first_round.get_or_insert_with(|| offsets.clone()), offsets);

    free_all(&mut allocator, &blocks);
    assert_eq!(shape(&allocator), single_free_block(1000));
  }

  allocator.destroy_pool();
}

#[test]
fn test_free_middle_block_fragmentation() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();
  let blocks = allocate_n(&mut allocator, 5, 200);

  allocator.deallocate(blocks[2]).unwrap();

  assert!(matches!(
    allocator.allocate(210),
    Err(PoolError::OutOfMemory {
      requested: 210,
      largest_free: 200
    })
  ));

  let b150 = allocator.allocate(150).unwrap();
  assert_eq!(b150.offset(), 400);

  assert!(matches!(
    allocator.allocate(60),
    Err(PoolError::OutOfMemory {
      requested: 60,
      largest_free: 50
    })
  ));

  let b50 = allocator.allocate(50).unwrap();
  assert_eq!(b50.offset(), 550);
  assert_eq!(allocator.pool().unwrap().stats().free_bytes, 0);

  free_all(&mut allocator, &[blocks[0], blocks[1], b150, blocks[3], blocks[4], b50]);
  assert_eq!(shape(&allocator), single_free_block(1000));
}

#[test]
fn test_stored_characters_survive() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();
  let blocks = allocate_n(&mut allocator, 5, 200);

  let pool = allocator.pool_mut().unwrap();
  for (&address, letter) in blocks.iter().zip(b'A'..) {
    let bytes = pool.bytes_mut(address).unwrap();
    bytes[..199].fill(letter);
    bytes[199] = 0;
  }

  for (&address, letter) in blocks.iter().zip(b'A'..) {
    let bytes = pool.bytes(address).unwrap();
    assert!(bytes[..199].iter().all(|&byte| byte == letter));
    assert_eq!(bytes[199], 0);
  }

  allocator.destroy_pool();
}

#[test]
fn test_request_and_return() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();

  for (count, size) in [(1, 1000), (4, 250), (10, 100)] {
    let blocks = allocate_n(&mut allocator, count, size);
    assert_eq!(allocator.pool().unwrap().stats().free_bytes, 0);

    free_all(&mut allocator, &blocks);
    assert_eq!(shape(&allocator), single_free_block(1000));
  }

  allocator.destroy_pool();
}

#[test]
fn test_isolated_round_trip_restores_shape() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();
  let blocks = allocate_n(&mut allocator, 3, 100);
  allocator.deallocate(blocks[1]).unwrap();
  let before = shape(&allocator);

  let address = allocator.allocate(40).unwrap();
  assert_ne!(shape(&allocator), before);
  allocator.deallocate(address).unwrap();

  assert_eq!(shape(&allocator), before);
}

#[test]
fn test_double_free_reported() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();
  let address = allocator.allocate(100).unwrap();
  allocator.deallocate(address).unwrap();

  let err = allocator.deallocate(address).unwrap_err();

  assert!(matches!(err, PoolError::InvalidAddress { address: a } if a == address));
  assert_eq!(shape(&allocator), single_free_block(1000));
}

#[test]
fn test_oversized_request_is_out_of_range() {
  let mut allocator = PoolAllocator::new();
  allocator.create_pool(1000).unwrap();

  assert!(matches!(
    allocator.allocate(1001),
    Err(PoolError::OutOfRange {
      requested: 1001,
      capacity: 1000
    })
  ));
}
