/// Tick-driven reload trigger.
///
/// Always fires on the very first tick so the initial load happens once the
/// host loop is up. With auto-reload enabled it fires again whenever the
/// tick counter passes the interval.
#[derive(Debug, Clone)]
pub struct ReloadTimer {
    first_tick: bool,
    auto_reload: bool,
    interval_ticks: u64,
    elapsed: u64,
}

impl ReloadTimer {
    pub fn new(auto_reload: bool, interval_ticks: u64) -> Self {
        Self {
            first_tick: true,
            auto_reload,
            interval_ticks,
            elapsed: 0,
        }
    }

    /// Advances one tick. Returns true when a reload should be requested.
    pub fn tick(&mut self) -> bool {
        let mut fire = std::mem::take(&mut self.first_tick);

        if self.auto_reload {
            self.elapsed += 1;
            if self.elapsed > self.interval_ticks {
                self.elapsed = 0;
                fire = true;
            }
        }

        fire
    }
}
