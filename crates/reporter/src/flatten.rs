//! Snapshot flattening
//!
//! Expands each metric into `(name, value)` pairs. One function per metric
//! kind; a timer is the distribution routine followed by the metered one,
//! so timer suffixes cannot drift from histogram and meter suffixes.
//!
//! | Kind      | Suffixes                                                             |
//! |-----------|----------------------------------------------------------------------|
//! | gauge     | (none)                                                               |
//! | counter   | `count`                                                              |
//! | histogram | `count`, `max`, `mean`, `min`, `stddev`, `p50` … `p999`              |
//! | meter     | `count`, `m1_rate`, `m5_rate`, `m15_rate`, `mean_rate`               |
//! | timer     | `max` … `p999` (durations), then `count` … `mean_rate` (rates)       |

use n9e_config::TimeUnit;
use n9e_metrics::{
    Distribution, HistogramSnapshot, MeterSnapshot, RegistrySnapshot, TimerSnapshot, Value,
};

/// One flattened measurement, before tags and timestamp are attached
pub type Flat = (String, Value);

/// Names and rescales flattened samples
#[derive(Debug, Clone)]
pub struct Flattener {
    prefix: Option<String>,
    rate_factor: f64,
    duration_nanos: f64,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(None, TimeUnit::Seconds, TimeUnit::Milliseconds)
    }
}

impl Flattener {
    pub fn new(prefix: Option<String>, rate_unit: TimeUnit, duration_unit: TimeUnit) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            rate_factor: rate_unit.as_secs_f64(),
            duration_nanos: duration_unit.as_nanos(),
        }
    }

    /// Events per second to events per rate unit
    #[inline]
    pub fn convert_rate(&self, rate: f64) -> f64 {
        rate * self.rate_factor
    }

    /// Nanoseconds to duration units
    #[inline]
    pub fn convert_duration(&self, nanos: f64) -> f64 {
        nanos / self.duration_nanos
    }

    /// `prefix.name.suffix`, skipping whichever parts are empty
    pub fn name(&self, name: &str, suffix: &str) -> String {
        n9e_metrics::name(&[self.prefix.as_deref().unwrap_or_default(), name, suffix])
    }

    pub fn gauge(&self, name: &str, value: Option<&Value>, out: &mut Vec<Flat>) {
        if let Some(value) = value {
            out.push((self.name(name, ""), value.clone()));
        }
    }

    pub fn counter(&self, name: &str, count: i64, out: &mut Vec<Flat>) {
        out.push((self.name(name, "count"), Value::Int(count)));
    }

    pub fn histogram(&self, name: &str, snapshot: &HistogramSnapshot, out: &mut Vec<Flat>) {
        out.push((self.name(name, "count"), Value::UInt(snapshot.count)));
        self.distribution(name, &snapshot.distribution, |v| v, out);
    }

    pub fn meter(&self, name: &str, snapshot: &MeterSnapshot, out: &mut Vec<Flat>) {
        self.metered(name, snapshot, out);
    }

    pub fn timer(&self, name: &str, snapshot: &TimerSnapshot, out: &mut Vec<Flat>) {
        self.distribution(name, &snapshot.distribution, |v| self.convert_duration(v), out);
        self.metered(name, &snapshot.rates, out);
    }

    /// Flatten a whole snapshot: gauges, counters, histograms, meters, timers,
    /// each kind in name order
    pub fn snapshot(&self, snapshot: &RegistrySnapshot) -> Vec<Flat> {
        let mut out = Vec::with_capacity(
            snapshot.gauges.len()
                + snapshot.counters.len()
                + snapshot.histograms.len() * 11
                + snapshot.meters.len() * 5
                + snapshot.timers.len() * 15,
        );

        for (name, value) in &snapshot.gauges {
            self.gauge(name, value.as_ref(), &mut out);
        }
        for (name, count) in &snapshot.counters {
            self.counter(name, *count, &mut out);
        }
        for (name, histogram) in &snapshot.histograms {
            self.histogram(name, histogram, &mut out);
        }
        for (name, meter) in &snapshot.meters {
            self.meter(name, meter, &mut out);
        }
        for (name, timer) in &snapshot.timers {
            self.timer(name, timer, &mut out);
        }
        out
    }

    fn distribution(
        &self,
        name: &str,
        d: &Distribution,
        convert: impl Fn(f64) -> f64,
        out: &mut Vec<Flat>,
    ) {
        let stats = [
            ("max", d.max),
            ("mean", d.mean),
            ("min", d.min),
            ("stddev", d.stddev),
            ("p50", d.p50),
            ("p75", d.p75),
            ("p95", d.p95),
            ("p98", d.p98),
            ("p99", d.p99),
            ("p999", d.p999),
        ];
        for (suffix, value) in stats {
            out.push((self.name(name, suffix), Value::Float(convert(value))));
        }
    }

    fn metered(&self, name: &str, m: &MeterSnapshot, out: &mut Vec<Flat>) {
        out.push((self.name(name, "count"), Value::UInt(m.count)));
        let rates = [
            ("m1_rate", m.m1_rate),
            ("m5_rate", m.m5_rate),
            ("m15_rate", m.m15_rate),
            ("mean_rate", m.mean_rate),
        ];
        for (suffix, rate) in rates {
            out.push((self.name(name, suffix), Value::Float(self.convert_rate(rate))));
        }
    }
}
