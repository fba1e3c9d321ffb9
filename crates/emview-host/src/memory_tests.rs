use emview::Ptr;

use super::{LinearMemory, MemoryConfig, MemoryError, alloc_str_arr};

fn small(max_size: usize) -> LinearMemory {
    LinearMemory::new(MemoryConfig {
        initial_size: 64,
        max_size,
        reserved: 16,
    })
}

#[test]
fn new_memory_reserves_low_bytes() {
    let mem = LinearMemory::default();

    assert_eq!(mem.len(), 65_536);
    assert_eq!(mem.top(), 16);
    assert!(mem.as_slice().iter().all(|&b| b == 0));
}

#[test]
fn alloc_aligns_and_always_pads() {
    let mut mem = LinearMemory::default();

    let a = mem.alloc(4, 10).unwrap();
    assert_eq!((a.original(), a.addr(), a.end()), (16, 20, 30));
    assert_eq!(mem.top(), 30);

    let b = mem.alloc(8, 4).unwrap();
    assert_eq!((b.original(), b.addr()), (30, 32));
    assert_eq!(mem.top(), 42);

    let c = mem.alloc(1, 3).unwrap();
    assert_eq!(c.addr(), 43);
    assert_eq!(c.ptr(), Ptr(43));
    assert_eq!(c.size(), 3);
}

#[test]
fn alloc_rejects_bad_alignment() {
    let mut mem = LinearMemory::default();

    assert_eq!(mem.alloc(0, 4), Err(MemoryError::InvalidAlignment(0)));
    assert_eq!(mem.alloc(3, 4), Err(MemoryError::InvalidAlignment(3)));
    assert_eq!(mem.top(), 16);
}

#[test]
fn alloc_grows_by_whole_pages() {
    let mut mem = small(1 << 20);
    assert_eq!(mem.len(), 64);

    mem.alloc(4, 100).unwrap();
    assert_eq!(mem.len(), 65_536);

    mem.alloc(4, 70_000).unwrap();
    assert_eq!(mem.len(), 2 * 65_536);
}

#[test]
fn growth_stops_at_max_size() {
    let mut mem = small(128);

    let block = mem.alloc(4, 100).unwrap();
    assert_eq!(block.end(), 120);
    assert_eq!(mem.len(), 128);

    assert_eq!(
        mem.alloc(4, 8),
        Err(MemoryError::OutOfMemory {
            requested: 12,
            top: 120,
            limit: 128
        })
    );
    assert_eq!(mem.top(), 120);
}

#[test]
fn release_rewinds_to_mark() {
    let mut mem = LinearMemory::default();
    mem.alloc(4, 8).unwrap();

    let mark = mem.mark();
    let first = mem.alloc(4, 32).unwrap();
    mem.alloc(8, 64).unwrap();
    mem.release(mark);

    assert_eq!(mem.top(), 28);
    assert_eq!(mem.alloc(4, 32).unwrap(), first);
}

#[test]
fn free_at_top_lowers_top() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 8).unwrap();
    let b = mem.alloc(4, 8).unwrap();
    assert_eq!(mem.top(), 40);

    mem.free(b);
    assert_eq!(mem.top(), 28);
    mem.free(a);
    assert_eq!(mem.top(), 16);
    assert_eq!(mem.free_len(), 0);
}

#[test]
fn free_out_of_order_merges_spans() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 16).unwrap();
    let b = mem.alloc(4, 16).unwrap();
    let c = mem.alloc(8, 8).unwrap();
    assert_eq!((c.original(), c.addr()), (56, 64));

    mem.free(b);
    assert_eq!(mem.free_len(), 20);
    mem.free(a);
    assert_eq!(mem.free_len(), 40);
    assert_eq!(mem.top(), 72);

    // One merged span covers both blocks.
    let d = mem.alloc(4, 36).unwrap();
    assert_eq!((d.original(), d.addr()), (16, 20));
    assert_eq!(mem.free_len(), 0);

    mem.free(c);
    mem.free(d);
    assert_eq!(mem.top(), 16);
}

#[test]
fn freed_block_is_reused_without_touching_neighbours() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 16).unwrap();
    let strs = alloc_str_arr(&mut mem, &["ab", "c"]).unwrap();
    assert_eq!((a.addr(), strs.addr(), mem.top()), (20, 40, 57));

    mem.free(a);
    let reused = mem.alloc(4, 12).unwrap();
    assert_eq!(reused.addr(), 20);
    assert_eq!(mem.free_len(), 4);
    mem.write_bytes(reused.addr(), &[0xAB; 12]).unwrap();

    let fresh = mem.alloc(4, 64).unwrap();
    assert_eq!(fresh.addr(), 60);
    mem.write_bytes(fresh.addr(), &[0xCD; 64]).unwrap();

    let view = mem.str_arr(strs.addr()).unwrap();
    assert_eq!(view.get(0), b"ab");
    assert_eq!(view.get(1), b"c");
}

#[test]
fn release_drops_free_spans_above_mark() {
    let mut mem = LinearMemory::default();
    mem.alloc(4, 8).unwrap();

    let mark = mem.mark();
    let a = mem.alloc(4, 16).unwrap();
    mem.alloc(4, 16).unwrap();
    mem.free(a);
    assert_eq!(mem.free_len(), 20);

    mem.release(mark);
    assert_eq!(mem.top(), 28);
    assert_eq!(mem.free_len(), 0);
}

#[test]
fn release_absorbs_free_span_ending_at_mark() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 8).unwrap();
    let mark = mem.mark();
    mem.alloc(4, 8).unwrap();
    mem.free(a);

    mem.release(mark);
    assert_eq!(mem.top(), 16);
    assert_eq!(mem.free_len(), 0);
}

#[test]
fn release_above_top_is_noop() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 8).unwrap();
    let mark = mem.mark();
    mem.free(a);

    mem.release(mark);
    assert_eq!(mem.top(), 16);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "double free of block at 0x14")]
fn double_free_panics() {
    let mut mem = LinearMemory::default();
    let a = mem.alloc(4, 8).unwrap();
    mem.alloc(4, 8).unwrap();

    mem.free(a);
    mem.free(a);
}

#[test]
fn typed_read_write() {
    let mut mem = LinearMemory::default();

    mem.write(24, 1.5f64).unwrap();
    mem.write(32, Ptr(0x40)).unwrap();
    mem.write(36, -7i16).unwrap();

    assert_eq!(mem.read::<f64>(24), Ok(1.5));
    assert_eq!(mem.read::<Ptr>(32), Ok(Ptr(0x40)));
    assert_eq!(mem.read::<u32>(32), Ok(0x40));
    assert_eq!(mem.read::<i16>(36), Ok(-7));
    assert_eq!(mem.read_bytes(36, 2), Ok(&[0xF9, 0xFF][..]));
}

#[test]
fn write_array_is_back_to_back() {
    let mut mem = LinearMemory::default();

    mem.write_array(20, &[1u16, 2, 0x0300]).unwrap();

    assert_eq!(mem.read_bytes(20, 6), Ok(&[1, 0, 2, 0, 0, 3][..]));
}

#[test]
fn access_past_end_fails() {
    let mut mem = small(128);
    let size = mem.len();

    assert_eq!(
        mem.read::<u32>(62),
        Err(MemoryError::OutOfBounds {
            addr: 62,
            len: 4,
            size
        })
    );
    assert!(mem.write_bytes(60, &[0; 8]).is_err());
    assert!(mem.write_array(u32::MAX, &[1u8]).is_err());
}

#[test]
fn views_over_memory() {
    let mut mem = LinearMemory::default();
    mem.write(20, 2u32).unwrap();
    mem.write_array(24, &[10u32, 20]).unwrap();

    mem.raw_array_mut::<u32>(20).unwrap().set(0, 11);

    let array = mem.raw_array::<u32>(20).unwrap();
    assert_eq!(array.iter().collect::<Vec<_>>(), [11, 20]);
    assert!(mem.str_arr(0).is_err());
}

#[test]
fn error_display() {
    let err = MemoryError::OutOfMemory {
        requested: 12,
        top: 0x78,
        limit: 128,
    };
    assert_eq!(
        err.to_string(),
        "out of memory: need 12 bytes past 0x78, limit 128"
    );
    assert_eq!(
        MemoryError::InvalidAlignment(3).to_string(),
        "invalid alignment: 3 (must be a power of two)"
    );
}

#[test]
fn debug_format() {
    let mem = small(128);
    assert_eq!(
        format!("{mem:?}"),
        "LinearMemory { len: 64, top: 0x10, free_spans: 0, max_size: 128 }"
    );
}

mod properties {
    use proptest::prelude::*;

    use crate::{Allocation, LinearMemory};

    proptest! {
        #[test]
        fn allocations_are_aligned_and_disjoint(
            requests in proptest::collection::vec((0u32..5, 0usize..200), 1..40),
        ) {
            let mut mem = LinearMemory::default();
            let mut prev_end = 0u32;

            for (shift, size) in requests {
                let alignment = 1u32 << shift;
                let block = mem.alloc(alignment, size).unwrap();

                prop_assert!(block.addr() != 0);
                prop_assert_eq!(block.addr() % alignment, 0);
                prop_assert!(block.addr() >= prev_end);
                prop_assert!(block.end() <= mem.top());
                prev_end = block.end();
            }
        }

        #[test]
        fn free_never_disturbs_live_blocks(
            ops in proptest::collection::vec(
                (any::<bool>(), 0u32..4, 1usize..64, any::<prop::sample::Index>()),
                1..60,
            ),
        ) {
            let mut mem = LinearMemory::default();
            let mut live: Vec<(Allocation, u8)> = Vec::new();

            for (n, (release, shift, size, pick)) in ops.into_iter().enumerate() {
                if release && !live.is_empty() {
                    let (block, _) = live.swap_remove(pick.index(live.len()));
                    mem.free(block);
                } else {
                    let alignment = 1u32 << shift;
                    let block = mem.alloc(alignment, size).unwrap();
                    prop_assert_eq!(block.addr() % alignment, 0);
                    let fill = n as u8;
                    mem.write_bytes(block.addr(), &vec![fill; size]).unwrap();
                    live.push((block, fill));
                }

                for (block, fill) in &live {
                    let bytes = mem.read_bytes(block.addr(), block.size()).unwrap();
                    prop_assert!(bytes.iter().all(|b| b == fill));
                }
            }

            for (block, _) in live {
                mem.free(block);
            }
            prop_assert_eq!(mem.top(), 16);
            prop_assert_eq!(mem.free_len(), 0);
        }
    }
}
