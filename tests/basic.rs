use bipbuf::bip_buffer;

#[test]
fn write_to_the_beginning() {
    let (mut tx, mut rx) = bip_buffer::<u8>(512);

    let region = tx.write_acquire(320).expect("write");
    region.fill(0xE5);
    tx.write_release(320);

    let data = rx.read_acquire();
    assert_eq!(data.len(), 320);
    assert!(data.iter().all(|&b| b == 0xE5));
    rx.read_release(320);
}

#[test]
fn acquire_more_than_capacity() {
    let (mut tx, mut rx) = bip_buffer::<u8>(512);

    // The sentinel slot makes even a full-capacity request impossible.
    assert!(tx.write_acquire(512).is_none());
    assert!(tx.write_acquire(512 + 17).is_none());

    // Nothing was disturbed: the buffer still reads empty and accepts a
    // normal write afterwards.
    assert!(rx.read_acquire().is_empty());
    assert!(tx.write_acquire(511).is_some());
}

#[test]
fn read_from_empty() {
    let (_tx, mut rx) = bip_buffer::<u8>(512);
    assert!(rx.read_acquire().is_empty());
}

#[test]
fn wrap_around_write() {
    let (mut tx, mut rx) = bip_buffer::<u32>(512);

    let region = tx.write_acquire(320).expect("first write");
    let origin = region.as_ptr() as usize;
    region.fill(0xE5A1_D2C3);
    tx.write_release(320);

    assert_eq!(rx.read_acquire().len(), 320);
    rx.read_release(320);

    // Only 192 slots remain before the end of the storage, so this write
    // lands back at the head.
    let region = tx.write_acquire(240).expect("wrapping write");
    assert_eq!(region.as_ptr() as usize, origin);
    region.fill(0xA3B2_C1D0);
    tx.write_release(240);

    let data = rx.read_acquire();
    assert_eq!(data.as_ptr() as usize, origin);
    assert_eq!(data.len(), 240);
    assert!(data.iter().all(|&v| v == 0xA3B2_C1D0));
    rx.read_release(240);
}

#[test]
fn exact_end_write_keeps_tail() {
    let (mut tx, mut rx) = bip_buffer::<u8>(16);

    let region = tx.write_acquire(8).expect("first half");
    let base = region.as_ptr() as usize;
    region.fill(0x11);
    tx.write_release(8);

    assert_eq!(rx.read_acquire().len(), 8);
    rx.read_release(8);

    // Second half: the region ends exactly at the end of the storage and
    // must not wrap to the head spuriously.
    let region = tx.write_acquire(8).expect("second half");
    assert_eq!(region.as_ptr() as usize, base + 8);
    region.fill(0x22);
    tx.write_release(8);

    let data = rx.read_acquire();
    assert_eq!(data.as_ptr() as usize, base + 8);
    assert_eq!(data.len(), 8);
    assert!(data.iter().all(|&b| b == 0x22));
    rx.read_release(8);

    // Only now does the producer restart at the head.
    let region = tx.write_acquire(8).expect("wrapped write");
    assert_eq!(region.as_ptr() as usize, base);
    region.fill(0x33);
    tx.write_release(8);

    let data = rx.read_acquire();
    assert_eq!(data.as_ptr() as usize, base);
    assert!(data.iter().all(|&b| b == 0x33));
    rx.read_release(8);
}

#[test]
fn outstanding_read_survives_interleaved_write() {
    let (mut tx, mut rx) = bip_buffer::<f64>(512);

    let region = tx.write_acquire(320).expect("write");
    region.fill(42.4242);
    tx.write_release(320);

    let data = rx.read_acquire();
    assert_eq!(data.len(), 320);

    // A write acquired while the read region is still outstanding lands
    // directly behind it...
    let next = tx.write_acquire(120).expect("interleaved write");
    assert_eq!(
        next.as_ptr() as usize,
        data.as_ptr() as usize + 320 * core::mem::size_of::<f64>()
    );
    next.fill(-123.123);
    tx.write_release(120);

    // ...and the outstanding region is untouched.
    assert!(data.iter().all(|&v| v == 42.4242));
    rx.read_release(320);

    let data = rx.read_acquire();
    assert_eq!(data.len(), 120);
    assert!(data.iter().all(|&v| v == -123.123));
    rx.read_release(120);
}

#[test]
fn partial_release_publishes_prefix_only() {
    let (mut tx, mut rx) = bip_buffer::<u8>(64);

    let region = tx.write_acquire(16).expect("write");
    region[..10].fill(0xAB);
    tx.write_release(10);

    let data = rx.read_acquire();
    assert_eq!(data.len(), 10);
    assert!(data.iter().all(|&b| b == 0xAB));
    rx.read_release(10);
}
