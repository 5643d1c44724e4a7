use crate::io::error::Error;
use crate::model::molecule::Molecule;
use std::io::Write;

pub fn write<W: Write>(mut writer: W, molecule: &Molecule) -> Result<(), Error> {
    let atom_count = molecule.atom_count();
    let bond_count = molecule.bond_count();

    writeln!(writer, "{}", molecule.name)?;
    writeln!(writer, "synth-phore")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0  0999 V2000",
        atom_count, bond_count
    )?;

    for atom in &molecule.atoms {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
            atom.position[0],
            atom.position[1],
            atom.position[2],
            atom.element.symbol()
        )?;
    }

    for bond in &molecule.bonds {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.i + 1,
            bond.j + 1,
            bond.order.sdf_code()
        )?;
    }

    writeln!(writer, "M  END")?;
    writeln!(writer, "$$$$")?;
    Ok(())
}
