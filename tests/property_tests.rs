use proptest::prelude::*;
use recode_subs::parallel::normalize_parallel_chunked;
use recode_subs::{canonicalize, complement, normalize};

fn arb_record() -> impl Strategy<Value = String> {
    "[ACGTN>]{0,12}"
}

fn arb_trinucleotide() -> impl Strategy<Value = String> {
    "[ACGTN]{3}>[ACGT]"
}

proptest! {
    #[test]
    fn normalize_is_idempotent(records in prop::collection::vec(arb_trinucleotide(), 0..50)) {
        let once = normalize(&records, 1).unwrap();
        let twice = normalize(&once, 1).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn single_base_normalize_is_idempotent(
        records in prop::collection::vec("[ACGTN]>[ACGT]", 0..50),
    ) {
        let once = normalize(&records, 0).unwrap();
        let twice = normalize(&once, 0).unwrap();
        prop_assert!(once.iter().all(|r| matches!(r.as_bytes()[0], b'C' | b'T' | b'N')));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn complement_is_an_involution(record in arb_record()) {
        prop_assert_eq!(complement(&complement(&record)), record);
    }

    #[test]
    fn length_and_count_preserved(
        records in prop::collection::vec("[ACGTN>]{1,12}", 0..50),
    ) {
        let out = normalize(&records, 0).unwrap();
        prop_assert_eq!(out.len(), records.len());
        for (input, output) in records.iter().zip(&out) {
            prop_assert_eq!(input.len(), output.len());
        }
    }

    #[test]
    fn decision_base_is_canonical(record in arb_trinucleotide()) {
        let out = canonicalize(&record, 1).unwrap();
        let base = out.as_bytes()[1];
        prop_assert!(matches!(base, b'C' | b'T' | b'N'));
    }

    #[test]
    fn pyrimidine_records_pass_through(
        prefix in "[ACGTN]",
        middle in "[CT]",
        suffix in "[ACGTN]>[ACGT]",
    ) {
        let record = format!("{prefix}{middle}{suffix}");
        prop_assert_eq!(canonicalize(&record, 1), Some(record.clone()));
    }

    #[test]
    fn elements_are_independent(
        records in prop::collection::vec(arb_trinucleotide(), 1..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let i = pick.index(records.len());
        let batch = normalize(&records, 1).unwrap();
        let alone = normalize(&records[i..=i], 1).unwrap();
        prop_assert_eq!(&batch[i], &alone[0]);
    }

    #[test]
    fn short_records_fail(record in "[ACGTN>]{0,1}") {
        prop_assert!(normalize(&[record], 1).is_err());
    }

    #[test]
    fn parallel_matches_sequential(
        records in prop::collection::vec("[ACGTN>]{0,6}", 0..200),
        threads in 1usize..6,
        chunk_size in 1usize..40,
    ) {
        let sequential = normalize(&records, 1);
        let parallel = normalize_parallel_chunked(&records, 1, threads, chunk_size);
        prop_assert_eq!(parallel, sequential);
    }
}
