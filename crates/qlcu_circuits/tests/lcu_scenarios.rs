//! End-to-end LCU scenarios over random and structured operators

use num_complex::Complex64;
use qlcu_circuits::prelude::*;
use qlcu_circuits::{diagonal_block_encoding, is_involutory, QRegMap};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PAULIS: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

fn random_operator(rng: &mut ChaCha8Rng, n_qubits: usize, n_terms: usize, real: bool) -> PauliOperator {
    let mut op = PauliOperator::new();
    while op.len() < n_terms {
        let string = PauliString::from_pairs(
            (0..n_qubits).map(|q| (q, PAULIS[rng.gen_range(0..4)])),
        );
        let re = rng.gen_range(-1.0..1.0);
        let im = if real { 0.0 } else { rng.gen_range(-1.0..1.0) };
        op.add_term(string, Complex64::new(re, im));
    }
    op
}

#[test]
fn random_operators_are_block_encoded() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for (n_qubits, n_terms, real) in [(1, 2, true), (2, 3, false), (2, 5, true), (3, 6, false)] {
        let op = random_operator(&mut rng, n_qubits, n_terms, real);
        let lcu = build_lcu(&op, n_qubits).unwrap();
        let block = lcu.block_encoding().unwrap();
        let target = lcu.block_encoded_matrix().unwrap();
        assert!(
            linalg::approx_eq(&block, &target, 1e-9),
            "{} qubits, {} terms",
            n_qubits,
            n_terms
        );
        let unitary = lcu.get_unitary(None, None).unwrap();
        if real {
            assert!(is_involutory(&unitary));
        } else {
            assert!(!is_involutory(&unitary));
        }
    }
}

#[test]
fn diagonal_encoding_spans_unit_interval() {
    let op = diagonal_block_encoding(3).unwrap();
    let lcu = build_lcu(&op, 3).unwrap();
    let block = lcu.block_encoding().unwrap();
    // λ = 1, so the block is the grid itself
    for k in 0..8 {
        let expected = -1.0 + 2.0 * k as f64 / 7.0;
        assert!((block[[k, k]].re - expected).abs() < 1e-10);
    }
}

#[test]
fn lcu_absorbed_into_larger_circuit() {
    let op = PauliOperator::new()
        .with_term(PauliString::parse("Z").unwrap(), 0.5)
        .with_term(PauliString::parse("X").unwrap(), 0.5);
    let lcu = build_lcu(&op, 1).unwrap();

    // host names its registers differently and has a spare qubit
    let mut host = RegisterCircuit::with_name("host");
    let anc = host.add_q_register("anc", 1).unwrap();
    let sys = host.add_q_register("sys", 2).unwrap();
    let map = QRegMap::build(
        [lcu.qregs().prepare.clone(), lcu.qregs().state.clone()],
        [anc.clone(), QubitRegister::new("sys", 1)],
    )
    .unwrap();
    host.add_registerbox(&lcu, Some(&map), None).unwrap();
    host.add_gate(Gate::H(sys.qubit(1).unwrap())).unwrap();

    let hosted = RegisterBox::from_circuit(host.into_circuit()).unwrap();
    let post = SelectionMap::zeros(&anc.to_list());
    let block = hosted.get_unitary(Some(&post), None).unwrap();

    let h = linalg::from_mat2(&[
        [Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
        [Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)],
    ])
    .mapv(|z| z * std::f64::consts::FRAC_1_SQRT_2);
    let expected = linalg::kron(&lcu.block_encoded_matrix().unwrap(), &h);
    assert!(linalg::approx_eq(&block, &expected, 1e-10));
}

#[test]
fn statevector_of_block_encoding_applies_operator() {
    let op = PauliOperator::new()
        .with_term(PauliString::parse("ZI").unwrap(), 1.0)
        .with_term(PauliString::parse("IX").unwrap(), 1.0);
    let lcu = build_lcu(&op, 2).unwrap();
    // (Z⊗I + I⊗X)/2 |00> = (|00> + |01>)/2, renormalised
    let sv = lcu.get_statevector(Some(lcu.postselect())).unwrap();
    let r = std::f64::consts::FRAC_1_SQRT_2;
    assert!((sv[0].re - r).abs() < 1e-10);
    assert!((sv[1].re - r).abs() < 1e-10);
}

#[test]
fn controlled_power_of_lcu() {
    let op = PauliOperator::new()
        .with_term(PauliString::parse("Z").unwrap(), 0.9)
        .with_term(PauliString::parse("Y").unwrap(), Complex64::new(0.0, 0.2));
    let lcu = build_lcu(&op, 1).unwrap();
    let cp = lcu.powered(2).unwrap().controlled(1, None).unwrap();

    let sel = SelectionMap::new()
        .with(Qubit::new("a", 0), 1)
        .with(Qubit::new("p", 0), 0);
    let on = cp.get_unitary(Some(&sel), Some(&sel)).unwrap();
    let u = lcu.powered(2).unwrap();
    let expected = u.postselected_unitary().unwrap();
    assert!(linalg::approx_eq(&on, &expected, 1e-10));
}
