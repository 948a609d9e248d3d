#![feature(test)]
extern crate test;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use squiggle_hmm::*;
const SEED: u64 = 1293890;
const LEN: usize = 500;
const K: usize = 5;

fn simulated() -> (Vec<u8>, SquiggleRead) {
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
    let model = gen_seq::random_pore_model(&mut rng, K).unwrap();
    let template = gen_seq::generate_seq(&mut rng, LEN);
    let params = TransitionParameters::default();
    let read = gen_seq::simulate_read(&mut rng, "bench", &template, &model, &params).unwrap();
    (template, read)
}

#[bench]
fn forward_local(b: &mut test::Bencher) {
    let (template, read) = simulated();
    let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
    b.iter(|| score(&template, &input, AlignmentMode::Local).unwrap());
}

#[bench]
fn forward_global(b: &mut test::Bencher) {
    let (template, read) = simulated();
    let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
    b.iter(|| score(&template, &input, AlignmentMode::Global).unwrap());
}

#[bench]
fn viterbi_backtrack(b: &mut test::Bencher) {
    let (template, read) = simulated();
    let input = HmmInput::whole_strand(&read, Strand::Template).unwrap();
    b.iter(|| align(&template, &input, AlignmentMode::Local).unwrap());
}
