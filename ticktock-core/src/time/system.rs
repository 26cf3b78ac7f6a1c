use chrono::{DateTime, Utc};

use super::Nower;

/// Zero-sized type, delegates to `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNow;

impl Nower for SystemNow {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn tracks_wall_clock() {
        let before = Utc::now();
        let now = SystemNow.now();
        assert!(now >= before);
        assert!(Utc::now() - now < TimeDelta::seconds(1));
    }

    #[test]
    fn usable_behind_trait_object() {
        let nower: &dyn Nower = &SystemNow;
        assert!(nower.now() > DateTime::<Utc>::UNIX_EPOCH);
    }
}
