use pretty_log::{BufferPool, EncoderPool, EncoderPools, Entry, Field, Level, PoolConfig, PrettyEncoder};
use std::sync::Arc;
use std::thread;

fn pools() -> Arc<EncoderPools> {
    Arc::new(EncoderPools::default())
}

#[test]
fn test_acquire_returns_empty_buffer() {
    let pool = BufferPool::new(64, 4);
    let buf = pool.acquire();
    assert!(buf.is_empty());
    assert!(buf.capacity() >= 64);
}

#[test]
fn test_released_buffer_is_reused_and_truncated() {
    let pool = BufferPool::new(16, 4);
    let mut buf = pool.acquire();
    buf.append_str("some bytes that grow the buffer past its first capacity");
    let grown = buf.capacity();

    pool.release(buf);
    assert_eq!(pool.idle(), 1);

    let again = pool.acquire();
    assert!(again.is_empty());
    assert_eq!(again.capacity(), grown);
    assert_eq!(pool.idle(), 0);
}

#[test]
fn test_buffer_pool_caps_idle_list() {
    let pool = BufferPool::new(8, 2);
    let bufs: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
    for buf in bufs {
        pool.release(buf);
    }
    assert_eq!(pool.idle(), 2);
}

#[test]
fn test_encoder_pool_recycles_shells() {
    let pool = EncoderPool::new(8);
    let shell = pool.acquire();
    pool.release(shell);
    assert_eq!(pool.idle(), 1);

    let _reused = pool.acquire();
    assert_eq!(pool.idle(), 0);
}

#[test]
fn test_dropping_encoder_recycles_shell_and_buffer() {
    let pools = pools();
    {
        let enc = PrettyEncoder::with_pools(pools.clone());
        let _child = enc.with_fields(&[Field::string("k", "v")]);
    }
    assert_eq!(pools.encoders().idle(), 2);
    assert_eq!(pools.buffers().idle(), 2);
}

#[test]
fn test_rendered_buffer_belongs_to_caller() {
    let pools = pools();
    let enc = PrettyEncoder::with_pools(pools.clone());

    let out = enc.encode_entry(&Entry::new(Level::Info, "hi"), &[]);
    // The scratch shell is back, its buffer is not.
    assert_eq!(pools.encoders().idle(), 1);
    assert_eq!(pools.buffers().idle(), 0);
    assert!(!out.buffer.is_empty());

    pools.release_buffer(out.buffer);
    assert_eq!(pools.buffers().idle(), 1);
}

#[test]
fn test_into_buffer_hands_over_bytes() {
    let pools = pools();
    let enc = PrettyEncoder::with_pools(pools.clone()).with_fields(&[Field::int("n", 1)]);
    let expected = enc.as_bytes().to_vec();

    let buf = enc.into_buffer();
    assert_eq!(buf.as_bytes(), expected.as_slice());
    assert_eq!(pools.encoders().idle(), 2);
}

#[test]
fn test_config_limits_idle_encoders() {
    let pools = Arc::new(EncoderPools::new(PoolConfig {
        buffer_capacity: 32,
        max_idle_buffers: 1,
        max_idle_encoders: 1,
    }));
    let encoders: Vec<_> = (0..3).map(|_| PrettyEncoder::with_pools(pools.clone())).collect();
    drop(encoders);

    assert_eq!(pools.encoders().idle(), 1);
    assert_eq!(pools.buffers().idle(), 1);
}

#[test]
fn test_shared_pools_are_process_wide() {
    assert!(Arc::ptr_eq(&EncoderPools::shared(), &EncoderPools::shared()));
    assert!(Arc::ptr_eq(PrettyEncoder::new().pools(), &EncoderPools::shared()));
}

#[test]
fn test_concurrent_rendering() {
    let pools = pools();
    let root = PrettyEncoder::with_pools(pools.clone());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ctx = root.with_fields(&[Field::int("thread", t)]);
            thread::spawn(move || {
                for i in 0..200 {
                    let out = ctx.encode_entry(&Entry::new(Level::Info, "work"), &[Field::int("i", i)]);
                    let line = out.buffer.to_string_lossy();
                    assert!(
                        line.ends_with(&format!(
                            " \x1b[32mthread\x1b[0m={} \x1b[32mi\x1b[0m={}\n",
                            t, i
                        )),
                        "unexpected line {:?}",
                        line
                    );
                    ctx.pools().release_buffer(out.buffer);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(root.is_empty());
    assert!(pools.buffers().idle() <= PoolConfig::default().max_idle_buffers);
}
