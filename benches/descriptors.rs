use rdesc::chem::descriptors::{Calculator, Descriptor};
use rdesc::chem::mqn::{mqn, Mqn};
use rdesc::chem::Molecule;
use rdesc::table::Value;

fn main() {
    divan::main();
}

const SMILES: &str = "CN1CCC[C@H]1c1cccnc1.CC(=O)Oc1ccccc1C(=O)O.\
CN1C=NC2=C1C(=O)N(C(=O)N2C)C.CC(C)Cc1ccc(cc1)[C@@H](C)C(=O)O.\
O=C(O)c1ccccc1Nc1cccc(C(F)(F)F)c1";

#[divan::bench]
fn parse() -> Molecule {
    Molecule::from_smiles(divan::black_box(SMILES)).unwrap()
}

#[divan::bench(args = [Molecule::from_smiles(SMILES).unwrap()])]
fn all_descriptors(mol: &Molecule) -> Vec<Value> {
    let names = Descriptor::ALL.iter().map(|d| d.name().to_owned()).collect();
    Calculator::new(names).calc(mol)
}

#[divan::bench(args = [Molecule::from_smiles(SMILES).unwrap()])]
fn mqn_vector(mol: &Molecule) -> Mqn {
    mqn(mol)
}
