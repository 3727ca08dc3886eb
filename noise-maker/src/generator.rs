use chrono::{NaiveDate, NaiveTime};
use rand::{Rng, seq::IndexedRandom};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STATUS: [(u16, u8); 9] = [
    (200, 50),
    (201, 10),
    (303, 5),
    (400, 10),
    (401, 20),
    (404, 50),
    (500, 5),
    (502, 3),
    (503, 2),
];

// A small pool so the same ip shows up more than once per hour.
const SUBNETS: [&str; 3] = ["10.0.191", "10.0.12", "192.168.1"];

pub fn generate_json_log<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> String {
    let seconds = rng.random_range(0..86_400);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default();
    let ts = day.and_time(time).format(TIME_FORMAT);
    let subnet = SUBNETS.choose(rng).copied().unwrap_or(SUBNETS[0]);
    let ip = format!("{subnet}.{}", rng.random_range(1..64));
    let status = STATUS
        .choose_weighted(rng, |(_, w)| *w)
        .map(|(s, _)| *s)
        .unwrap_or(200);

    format!("{{\"time\":\"{ts}\",\"ip\":\"{ip}\",\"status_code\":{status}}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn entries_are_single_line_json() {
        let mut rng = StdRng::seed_from_u64(7);
        let day = NaiveDate::from_ymd_opt(2019, 5, 14).unwrap();
        for _ in 0..200 {
            let line = generate_json_log(&mut rng, day);
            assert_that!(line.contains('\n')).is_false();
            let value: serde_json::Value = serde_json::from_str(&line).unwrap();
            assert_that!(value["time"].as_str().unwrap().starts_with("2019-05-14 ")).is_true();
            assert_that!(value["ip"].is_string()).is_true();
            let status = value["status_code"].as_u64().unwrap();
            assert_that!(STATUS.iter().any(|(s, _)| u64::from(*s) == status)).is_true();
        }
    }

    #[test]
    fn same_seed_same_output() {
        let day = NaiveDate::from_ymd_opt(2019, 5, 14).unwrap();
        let a = generate_json_log(&mut StdRng::seed_from_u64(1), day);
        let b = generate_json_log(&mut StdRng::seed_from_u64(1), day);
        assert_that!(a).is_equal_to(b);
    }
}
