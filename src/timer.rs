use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired<K>
{
    pub kind: K,
    pub round: u64,
}

struct Scheduled<K>
{
    id: TimerId,
    kind: K,
    round: u64,
    due: Instant,
    period: Option<Duration>,
}

pub struct TimerQueue<K>
{
    next_id: u64,
    pending: Vec<Scheduled<K>>,
}

impl<K: Copy> TimerQueue<K>
{
    pub fn new() -> Self
    {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule_once(&mut self, kind: K, round: u64, now: Instant, delay: Duration) -> TimerId
    {
        self.push(kind, round, now + delay, None)
    }

    pub fn schedule_every(&mut self, kind: K, round: u64, now: Instant, period: Duration) -> TimerId
    {
        let period = period.max(Duration::from_millis(1));
        self.push(kind, round, now + period, Some(period))
    }

    fn push(&mut self, kind: K, round: u64, due: Instant, period: Option<Duration>) -> TimerId
    {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            kind,
            round,
            due,
            period,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool
    {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self)
    {
        self.pending.clear();
    }

    /// Periodic timers re-arm one period after `now`, so a late frame fires
    /// them once and the missed periods are dropped.
    pub fn pop_due(&mut self, now: Instant) -> Option<Fired<K>>
    {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id.0))
            .map(|(index, _)| index)?;

        let timer = &mut self.pending[index];
        let fired = Fired {
            kind: timer.kind,
            round: timer.round,
        };
        match timer.period {
            Some(period) => timer.due = now + period,
            None => {
                self.pending.swap_remove(index);
            }
        }
        Some(fired)
    }
}

impl<K: Copy> Default for TimerQueue<K>
{
    fn default() -> Self
    {
        Self::new()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Kind
    {
        Tick,
        Alarm,
    }

    #[test]
    fn once_fires_only_after_delay()
    {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let id = queue.schedule_once(Kind::Alarm, 1, t0, Duration::from_secs(3));

        assert!(queue.pop_due(t0 + Duration::from_millis(2999)).is_none());
        let fired = queue.pop_due(t0 + Duration::from_secs(3)).unwrap();
        assert_eq!(fired.kind, Kind::Alarm);
        assert_eq!(fired.round, 1);
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn periodic_fires_once_when_late()
    {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_every(Kind::Tick, 0, t0, Duration::from_secs(2));

        let late = t0 + Duration::from_millis(6500);
        let mut count = 0;
        while let Some(fired) = queue.pop_due(late) {
            assert_eq!(fired.kind, Kind::Tick);
            count += 1;
        }
        assert_eq!(count, 1);
        assert!(queue.pop_due(t0 + Duration::from_secs(8)).is_none());
        assert!(queue.pop_due(t0 + Duration::from_millis(8500)).is_some());
    }

    #[test]
    fn cancelled_timer_never_fires()
    {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        let id = queue.schedule_once(Kind::Alarm, 0, t0, Duration::from_secs(1));

        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn earliest_due_pops_first()
    {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_once(Kind::Alarm, 0, t0, Duration::from_secs(3));
        queue.schedule_every(Kind::Tick, 0, t0, Duration::from_secs(2));

        let at = t0 + Duration::from_secs(3);
        assert_eq!(queue.pop_due(at).unwrap().kind, Kind::Tick);
        assert_eq!(queue.pop_due(at).unwrap().kind, Kind::Alarm);
        assert!(queue.pop_due(at).is_none());
    }

    #[test]
    fn cancel_all_empties_queue()
    {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_every(Kind::Tick, 0, t0, Duration::from_secs(2));
        queue.schedule_once(Kind::Alarm, 0, t0, Duration::from_secs(3));
        queue.cancel_all();
        assert!(queue.pop_due(t0 + Duration::from_secs(10)).is_none());
    }
}
