//! Property-based tests for fugue-dream
//!
//! Uses proptest to check the shape of fantasized records over arbitrary
//! data sizes.

use fugue::addr;
use fugue_dream::prelude::*;
use proptest::prelude::*;

fn run_single(n: usize, seed: u64) -> Record {
    let data: Vec<Datum> = (0..n).map(|i| Datum::from(i as f64)).collect();
    let mut env = Env::seeded(seed);
    let model = |env: &mut Env, _address: &Address| -> DreamResult<()> {
        env.map_data(&data, None, &addr!("data"), |env, _datum, address| {
            env.observe(address.clone(), Normal::standard(), None)?;
            Ok(())
        })
    };
    FantasyCoroutine::new()
        .run(&mut env, &model, &Store::new(), &addr!("root"))
        .unwrap()
}

fn run_arrays(n: usize, k: usize, seed: u64) -> Record {
    let data: Vec<Datum> = (0..n).map(|_| Datum::from(vec![0.0; k])).collect();
    let mut env = Env::seeded(seed);
    let model = |env: &mut Env, _address: &Address| -> DreamResult<()> {
        env.map_data(&data, None, &addr!("data"), |env, datum, address| {
            for j in 0..datum.len() {
                env.observe(Address(format!("{}#{}", address.0, j)), Normal::standard(), None)?;
            }
            Ok(())
        })
    };
    FantasyCoroutine::new()
        .run(&mut env, &model, &Store::new(), &addr!("root"))
        .unwrap()
}

proptest! {
    #[test]
    fn one_scalar_per_datum(n in 0usize..30, seed in any::<u64>()) {
        let record = run_single(n, seed);
        prop_assert_eq!(record.data.len(), n);
        prop_assert!(record.data.iter().all(|d| d.as_single().is_some()));
        prop_assert_eq!(record.trace.observations().count(), n);
    }

    #[test]
    fn array_datum_matches_call_order(n in 1usize..10, k in 1usize..6, seed in any::<u64>()) {
        let record = run_arrays(n, k, seed);
        prop_assert_eq!(record.data.len(), n);

        let observed: Vec<f64> = record
            .trace
            .iter()
            .filter_map(|c| value_as_f64(&c.value))
            .collect();
        for (i, datum) in record.data.iter().enumerate() {
            let values = datum.as_multiple().unwrap();
            prop_assert_eq!(values.len(), k);
            for (j, value) in values.iter().enumerate() {
                prop_assert_eq!(value_as_f64(value), Some(observed[i * k + j]));
            }
        }
    }

    #[test]
    fn same_seed_same_fantasy(n in 1usize..10, seed in any::<u64>()) {
        let first = run_single(n, seed);
        let second = run_single(n, seed);
        let values = |record: &Record| -> Vec<Option<f64>> {
            record
                .data
                .iter()
                .map(|d| d.as_single().and_then(value_as_f64))
                .collect()
        };
        prop_assert_eq!(values(&first), values(&second));
    }
}
