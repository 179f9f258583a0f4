use super::rand::RAND_MAX;
use super::*;
use rand_core::RngCore;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn semaphore_hands_out_exactly_its_permits() {
    let sem = Semaphore::new(2);
    assert_eq!(sem.wait(10), Ok(()));
    assert_eq!(sem.wait(10), Ok(()));
    assert_eq!(sem.wait(10), Err(SysError::TimedOut));
    // one signal admits exactly one more waiter
    sem.signal();
    assert_eq!(sem.wait(10), Ok(()));
    assert_eq!(sem.wait(10), Err(SysError::TimedOut));
}

#[test]
fn semaphore_wait_respects_deadline() {
    let sem = Semaphore::new(0);
    let start = Instant::now();
    assert_eq!(sem.wait(30), Err(SysError::TimedOut));
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn semaphore_signal_wakes_waiter_on_another_thread() {
    let sem = Arc::new(Semaphore::new(0));
    let signaler = sem.clone();
    let t = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        signaler.signal();
    });
    // timeout 0 = wait forever
    assert_eq!(sem.wait(0), Ok(()));
    t.join().unwrap();
}

#[test]
fn invalidated_semaphore_is_a_checked_error() {
    let sem = Semaphore::new(1);
    sem.invalidate();
    assert!(!sem.is_valid());
    assert_eq!(sem.wait(1), Err(SysError::InvalidArgument));
    // signal after invalidation must not resurrect a permit
    sem.signal();
    assert_eq!(sem.wait(1), Err(SysError::InvalidArgument));
}

#[test]
fn destroyed_semaphore_drops_its_count() {
    let sem = Semaphore::new(3);
    sem.destroy();
    assert!(!sem.is_valid());
    assert_eq!(sem.wait(1), Err(SysError::InvalidArgument));
}

#[test]
fn mutex_serializes_two_threads() {
    let mutex = Arc::new(SysMutex::new());
    mutex.lock().unwrap();
    let unlocker = mutex.clone();
    let t = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        unlocker.unlock();
    });
    assert_eq!(mutex.lock(), Ok(()));
    t.join().unwrap();
    mutex.unlock();
}

#[test]
fn mailbox_delivers_in_fifo_order() {
    let mbox = Mailbox::new(8).unwrap();
    mbox.post(1u32).unwrap();
    mbox.post(2).unwrap();
    mbox.post(3).unwrap();
    assert_eq!(mbox.len(), 3);
    assert_eq!(mbox.fetch(10), Ok(1));
    assert_eq!(mbox.fetch(10), Ok(2));
    assert_eq!(mbox.fetch(10), Ok(3));
    assert!(mbox.is_empty());
}

#[test]
fn mailbox_rejects_zero_capacity() {
    assert!(matches!(
        Mailbox::<u32>::new(0),
        Err(SysError::InvalidArgument)
    ));
}

#[test]
fn full_mailbox_hands_the_message_back() {
    let mbox = Mailbox::new(2).unwrap();
    assert_eq!(mbox.try_post(1u32), Ok(()));
    assert_eq!(mbox.try_post(2), Ok(()));
    assert_eq!(mbox.try_post(3), Err(3));
    assert_eq!(mbox.len(), 2);
}

#[test]
fn empty_mailbox_fetch_times_out() {
    let mbox = Mailbox::<u32>::new(4).unwrap();
    assert_eq!(mbox.try_fetch(), Err(SysError::Empty));
    let start = Instant::now();
    assert_eq!(mbox.fetch(20), Err(SysError::TimedOut));
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn blocking_post_waits_for_a_consumer() {
    let mbox = Arc::new(Mailbox::new(1).unwrap());
    mbox.post(1u32).unwrap();
    let consumer = mbox.clone();
    let t = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        consumer.fetch(0)
    });
    mbox.post(2).unwrap();
    assert_eq!(t.join().unwrap(), Ok(1));
    assert_eq!(mbox.fetch(10), Ok(2));
}

#[test]
fn dead_mailbox_refuses_both_directions() {
    let mbox = Mailbox::new(4).unwrap();
    mbox.post(1u32).unwrap();
    mbox.invalidate();
    assert!(!mbox.is_valid());
    assert_eq!(mbox.try_post(2), Err(2));
    assert_eq!(mbox.try_fetch(), Err(SysError::InvalidArgument));
}

#[test]
fn single_core_protection_is_a_marker() {
    let region = ProtectRegion::new(1);
    let token = region.enter();
    assert!(!region.is_locked());
    region.exit(token);
    assert!(!region.is_locked());
}

#[test]
fn multicore_protection_holds_the_lock_for_the_region() {
    let region = ProtectRegion::new(4);
    let token = region.enter();
    assert!(region.is_locked());
    region.exit(token);
    assert!(!region.is_locked());
}

#[test]
fn lcg_matches_the_minimal_standard_sequence() {
    let rng = SeedRng::new(1);
    assert_eq!(rng.next_seeded(), 16807);
    assert_eq!(rng.next_seeded(), 282_475_249);
}

#[test]
fn same_seed_replays_the_same_sequence() {
    let a = SeedRng::new(5);
    let b = SeedRng::new(5);
    for _ in 0..64 {
        assert_eq!(a.next_seeded(), b.next_seeded());
    }
}

#[test]
fn zero_seed_is_remapped_not_stuck() {
    let zero = SeedRng::new(0);
    let subst = SeedRng::new(0x1234_5987);
    for _ in 0..16 {
        let v = zero.next_seeded();
        assert_eq!(v, subst.next_seeded());
        assert_ne!(v, 0);
    }
}

#[test]
fn values_stay_in_range() {
    let rng = SeedRng::new(123);
    for _ in 0..256 {
        let v = rng.next();
        assert!((0..=RAND_MAX).contains(&v));
    }
}

#[test]
fn rng_core_draws_from_the_seeded_stream() {
    // The host-test build has no RDRAND, so next_u32 is the LCG.
    let mut rng = SeedRng::new(1);
    assert_eq!(rng.next_u32(), 16807);
    let mut buf = [0u8; 7];
    rng.fill_bytes(&mut buf);
}

struct FixedSpawner;

impl TaskSpawner for FixedSpawner {
    fn spawn(
        &self,
        _name: &str,
        _entry: fn(usize),
        _arg: usize,
        _prio: u8,
    ) -> Result<TaskId, SpawnError> {
        Ok(TaskId(7))
    }
}

static SPAWNER: FixedSpawner = FixedSpawner;

fn task_body(_arg: usize) {}

#[test]
fn context_spawns_through_the_installed_hook() {
    let mut ctx = SysContext::new(2, 42);
    assert_eq!(ctx.cores(), 2);
    assert_eq!(
        ctx.spawn("netd", task_body, 0, 1),
        Err(SpawnError::NoScheduler)
    );
    ctx.set_spawner(&SPAWNER);
    assert_eq!(ctx.spawn("netd", task_body, 0, 1), Ok(TaskId(7)));
}

#[test]
fn context_from_clock_is_usable() {
    let ctx = SysContext::from_clock(1);
    assert_eq!(ctx.cores(), 1);
    let v = ctx.rng.next_seeded();
    assert!((0..=RAND_MAX).contains(&v));
}
