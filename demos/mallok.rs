//! Walks through the classic pool-of-1000 exercises and prints the block map
//! after each one.
//!
//! Run with `RUST_LOG=rpool=trace` to see every split and merge.

use rpool::{Address, PoolAllocator, PoolResult};
use tracing_subscriber::EnvFilter;

fn print_pool(
  label: &str,
  allocator: &PoolAllocator,
) -> PoolResult<()> {
  let pool = allocator.pool()?;
  println!("[{label}] {}", pool.stats());
  print!("{pool}");
  Ok(())
}

fn allocate_n(
  allocator: &mut PoolAllocator,
  count: usize,
  size: usize,
) -> PoolResult<Vec<Address>> {
  (0..count).map(|_| allocator.allocate(size)).collect()
}

fn free_all(
  allocator: &mut PoolAllocator,
  addresses: &[Address],
) -> PoolResult<()> {
  addresses
    .iter()
    .try_for_each(|&address| allocator.deallocate(address))
}

/// Counts how many 10-byte blocks fit in 1000 bytes.
fn blocks_of_ten(allocator: &mut PoolAllocator) -> PoolResult<()> {
  println!("\n== Blocks of size 10");
  allocator.create_pool(1000)?;

  let mut count = 0;
  while allocator.allocate(10).is_ok() {
    count += 1;
  }
  println!("blocks created: {count}");

  allocator.destroy_pool();
  Ok(())
}

/// Five rounds of five 200-byte blocks, all freed after each round.
fn reuse_rounds(allocator: &mut PoolAllocator) -> PoolResult<()> {
  println!("\n== Blocks of 200 bytes");
  allocator.create_pool(1000)?;

  for round in 1..=5 {
    let blocks = allocate_n(allocator, 5, 200)?;
    free_all(allocator, &blocks)?;
    println!("round {round}: ok");
  }
  print_pool("after rounds", allocator)?;

  allocator.destroy_pool();
  Ok(())
}

/// Frees the middle of five blocks and probes the 200-byte hole.
fn free_middle(allocator: &mut PoolAllocator) -> PoolResult<()> {
  println!("\n== Free middle block");
  allocator.create_pool(1000)?;
  let mut blocks = allocate_n(allocator, 5, 200)?;

  allocator.deallocate(blocks.remove(2))?;
  print_pool("hole", allocator)?;

  for size in [210, 150, 60, 50] {
    match allocator.allocate(size) {
      Ok(address) => {
        println!("allocated {size} at {address}");
        blocks.push(address);
      }
      Err(err) => println!("not allocated {size}: {err}"),
    }
  }
  print_pool("filled", allocator)?;

  free_all(allocator, &blocks)?;
  allocator.destroy_pool();
  Ok(())
}

/// Fills five blocks with 'A'..'E' and reads them back.
fn store_characters(allocator: &mut PoolAllocator) -> PoolResult<()> {
  println!("\n== Storing characters");
  allocator.create_pool(1000)?;
  let blocks = allocate_n(allocator, 5, 200)?;

  let pool = allocator.pool_mut()?;
  for (&address, letter) in blocks.iter().zip(b'A'..) {
    pool.bytes_mut(address)?.fill(letter);
  }
  for &address in &blocks {
    let bytes = pool.bytes(address)?;
    println!("{address}: {}", String::from_utf8_lossy(&bytes[..40]));
  }

  allocator.destroy_pool();
  Ok(())
}

/// 1 x 1000, then 4 x 250, then 10 x 100, each returned in full.
fn request_and_return(allocator: &mut PoolAllocator) -> PoolResult<()> {
  println!("\n== Request and return");
  allocator.create_pool(1000)?;

  for (count, size) in [(1, 1000), (4, 250), (10, 100)] {
    let blocks = allocate_n(allocator, count, size)?;
    free_all(allocator, &blocks)?;
    println!("request {size} x {count}: ok");
  }

  allocator.destroy_pool();
  Ok(())
}

fn main() -> PoolResult<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let mut allocator = PoolAllocator::new();

  blocks_of_ten(&mut allocator)?;
  reuse_rounds(&mut allocator)?;
  free_middle(&mut allocator)?;
  store_characters(&mut allocator)?;
  request_and_return(&mut allocator)?;

  // Nothing is live any more; this one is reported and ignored.
  allocator.destroy_pool();
  Ok(())
}
