// Batch driver determinism (P7/S6): results must not depend on the worker
// count, and every slot must match the single-shot entry.

use ferrous_pairhmm::hmm::{compute_batch, run_one, Testcase};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

fn synthetic_batch(n: usize) -> Vec<Testcase> {
    let mut rng = Lcg(0xBA7C_D2A5);
    (0..n)
        .map(|_| {
            let read_len = 8 + (rng.next() % 24) as usize;
            let hap_len = read_len + (rng.next() % 16) as usize;
            let hap: Vec<u8> = (0..hap_len)
                .map(|_| BASES[(rng.next() % 4) as usize])
                .collect();
            let read: Vec<u8> = (0..read_len)
                .map(|i| {
                    if rng.next() % 12 == 0 {
                        BASES[(rng.next() % 4) as usize]
                    } else {
                        hap[i]
                    }
                })
                .collect();
            let quals: Vec<u8> = (0..read_len).map(|_| 12 + (rng.next() % 34) as u8).collect();
            Testcase::new(
                hap,
                read,
                quals,
                vec![42; read_len],
                vec![42; read_len],
                vec![10; read_len],
            )
            .unwrap()
        })
        .collect()
}

// S6: 10 000 synthetic testcases, serial vs 8 workers, byte-identical
// output.
#[test]
fn s6_concurrency_independence() {
    let cases = synthetic_batch(10_000);
    let mut serial = vec![0.0f64; cases.len()];
    let mut parallel = vec![0.0f64; cases.len()];

    compute_batch(&cases, &mut serial, 1);
    compute_batch(&cases, &mut parallel, 8);

    assert_eq!(serial, parallel);
    assert!(serial.iter().all(|v| v.is_finite()));
}

#[test]
fn batch_slots_match_single_shot() {
    let cases = synthetic_batch(128);
    let mut out = vec![0.0f64; cases.len()];
    compute_batch(&cases, &mut out, 4);
    for (tc, &value) in cases.iter().zip(&out) {
        assert_eq!(value, run_one(tc));
    }
}

#[test]
fn repeated_runs_are_stable() {
    let cases = synthetic_batch(64);
    let mut first = vec![0.0f64; cases.len()];
    let mut second = vec![0.0f64; cases.len()];
    compute_batch(&cases, &mut first, 3);
    compute_batch(&cases, &mut second, 5);
    assert_eq!(first, second);
}
