use crate::io::{Format, error::Error};
use crate::model::{
    molecule::{Atom, Bond, Molecule},
    types::{BondOrder, Element},
};
use std::io::BufRead;

/// Streaming reader over the records of a multi-molecule SDF.
///
/// Each `$$$$`-delimited record yields one `Result`; a malformed record
/// produces an error without poisoning the records after it, so callers can
/// skip and count failures the way batch generation does.
pub struct SdfReader<R: BufRead> {
    lines: std::iter::Enumerate<std::io::Lines<R>>,
    done: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines().enumerate(),
            done: false,
        }
    }

    fn next_block(&mut self) -> Option<Result<Vec<(usize, String)>, Error>> {
        let mut block: Vec<(usize, String)> = Vec::new();
        loop {
            match self.lines.next() {
                Some((i, Ok(content))) => {
                    if content.trim() == "$$$$" {
                        if block.iter().all(|(_, l)| l.trim().is_empty()) {
                            block.clear();
                            continue;
                        }
                        return Some(Ok(block));
                    }
                    block.push((i + 1, content));
                }
                Some((_, Err(e))) => {
                    self.done = true;
                    return Some(Err(Error::Io { source: e }));
                }
                None => {
                    self.done = true;
                    if block.iter().all(|(_, l)| l.trim().is_empty()) {
                        return None;
                    }
                    return Some(Ok(block));
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<Molecule, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_block()? {
            Ok(block) => Some(parse_block(&block)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Reads the first molecule record, failing if the input holds none.
pub fn read<R: BufRead>(reader: R) -> Result<Molecule, Error> {
    SdfReader::new(reader)
        .next()
        .unwrap_or_else(|| Err(Error::parse(Format::Sdf, 1, "no molecule records found")))
}

fn parse_block(lines: &[(usize, String)]) -> Result<Molecule, Error> {
    let first_line = lines.first().map(|(ln, _)| *ln).unwrap_or(1);
    if lines.len() < 4 {
        return Err(Error::parse(
            Format::Sdf,
            first_line,
            "SDF record must contain at least a header and counts line",
        ));
    }

    let name = lines[0].1.trim().to_string();
    let counts_line_no = lines[3].0;
    let counts_line = &lines[3].1;
    if counts_line.contains("V3000") {
        return Err(Error::parse(
            Format::Sdf,
            counts_line_no,
            "V3000 is not supported",
        ));
    }

    let (atom_count, bond_count) = parse_counts(counts_line, counts_line_no)?;
    let atom_start = 4;
    let bond_start = atom_start + atom_count;

    if lines.len() < bond_start + bond_count {
        return Err(Error::parse(
            Format::Sdf,
            lines.last().map(|(ln, _)| *ln).unwrap_or(counts_line_no),
            "SDF record ended before atoms/bonds were fully specified",
        ));
    }

    let atoms = parse_atoms(&lines[atom_start..atom_start + atom_count])?;
    let bonds = parse_bonds(&lines[bond_start..bond_start + bond_count], atom_count)?;

    // Data items after "M  END" are tolerated and ignored.
    Ok(Molecule { name, atoms, bonds })
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::parse(
            Format::Sdf,
            line_no,
            "counts line must contain atom and bond counts",
        ));
    }
    let atoms = tokens[0]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid atom count"))?;
    let bonds = tokens[1]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atoms(lines: &[(usize, String)]) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let padded = format!("{raw:<40}");
        let x = padded[0..10]
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid x coordinate in atom line"))?;
        let y = padded[10..20]
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid y coordinate in atom line"))?;
        let z = padded[20..30]
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid z coordinate in atom line"))?;
        let element = parse_element_token(padded[31..34].trim())
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unable to infer element symbol"))?;
        atoms.push(Atom::new(element, [x, y, z]));
    }
    Ok(atoms)
}

/// Element fields show up in mixed case depending on the producing tool
/// ("CL", "cl", "Cl"); normalize before matching the symbol table.
fn parse_element_token(token: &str) -> Option<Element> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let normalized: String = first
        .to_ascii_uppercase()
        .to_string()
        .chars()
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();
    normalized.parse::<Element>().ok()
}

fn parse_bonds(lines: &[(usize, String)], atom_count: usize) -> Result<Vec<Bond>, Error> {
    let mut bonds = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let tokens: Vec<_> = raw.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(Error::parse(Format::Sdf, *ln, "invalid bond line"));
        }

        let a1 = tokens[0]
            .parse::<usize>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid first atom index"))?;
        let a2 = tokens[1]
            .parse::<usize>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid second atom index"))?;
        let order = tokens[2]
            .parse::<BondOrder>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "unsupported bond order in bond line"))?;

        if a1 == 0 || a2 == 0 || a1 > atom_count || a2 > atom_count {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                "bond references atom outside declared range",
            ));
        }

        bonds.push(Bond::new(a1 - 1, a2 - 1, order));
    }
    Ok(bonds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ETHANOL: &str = "\
ethanol
  synth-phore

  9  8  0  0  0  0  0  0  0  0999 V2000
   -0.8878   -0.1813    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.4713    0.4790    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5390   -0.4518    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
   -1.6631    0.5783    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
   -0.9511   -0.8062    0.8900 H   0  0  0  0  0  0  0  0  0  0  0  0
   -0.9511   -0.8062   -0.8900 H   0  0  0  0  0  0  0  0  0  0  0  0
    0.5346    1.1039    0.8900 H   0  0  0  0  0  0  0  0  0  0  0  0
    0.5346    1.1039   -0.8900 H   0  0  0  0  0  0  0  0  0  0  0  0
    2.3999    0.0008    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  1  0  0  0  0
  1  4  1  0  0  0  0
  1  5  1  0  0  0  0
  1  6  1  0  0  0  0
  2  7  1  0  0  0  0
  2  8  1  0  0  0  0
  3  9  1  0  0  0  0
M  END
$$$$
";

    fn two_records() -> String {
        let water = "\
water
  synth-phore

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    0.9600    0.0000    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
   -0.2400    0.9300    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  1  3  1  0  0  0  0
M  END
$$$$
";
        format!("{ETHANOL}{water}")
    }

    #[test]
    fn reads_multiple_records() {
        let mols: Vec<_> = SdfReader::new(Cursor::new(two_records()))
            .collect::<Result<Vec<_>, _>>()
            .expect("both records parse");
        assert_eq!(mols.len(), 2);
        assert_eq!(mols[0].name, "ethanol");
        assert_eq!(mols[0].atom_count(), 9);
        assert_eq!(mols[0].bond_count(), 8);
        assert_eq!(mols[1].name, "water");
        assert_eq!(mols[1].atom_count(), 3);
    }

    #[test]
    fn malformed_record_does_not_poison_later_ones() {
        let bad = "\
broken
  synth-phore

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
M  END
$$$$
";
        let input = format!("{bad}{ETHANOL}");
        let results: Vec<_> = SdfReader::new(Cursor::new(input)).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        let mol = results[1].as_ref().expect("second record still parses");
        assert_eq!(mol.name, "ethanol");
    }

    #[test]
    fn bond_index_out_of_range_is_rejected() {
        let input = "\
bad
  synth-phore

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  3  1  0  0  0  0
M  END
$$$$
";
        let err = read(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn v3000_is_rejected() {
        let input = "\
v3k
  synth-phore

  0  0  0  0  0  0  0  0  0  0999 V3000
M  END
$$$$
";
        let err = read(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn mixed_case_element_tokens_are_normalized() {
        let input = "\
salt
  synth-phore

  2  0  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 CL  0  0  0  0  0  0  0  0  0  0  0  0
    3.0000    0.0000    0.0000 na  0  0  0  0  0  0  0  0  0  0  0  0
M  END
$$$$
";
        let mol = read(Cursor::new(input)).expect("parses");
        assert_eq!(mol.atoms[0].element, Element::Cl);
        assert_eq!(mol.atoms[1].element, Element::Na);
    }

    #[test]
    fn data_items_after_m_end_are_ignored() {
        let input = "\
tagged
  synth-phore

  1  0  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
M  END
>  <activity>
1

$$$$
";
        let mol = read(Cursor::new(input)).expect("parses");
        assert_eq!(mol.atom_count(), 1);
    }

    // Empty pharmacophores are written as zero-atom records, so these must
    // keep round-tripping.
    #[test]
    fn zero_atom_record_parses_as_an_empty_molecule() {
        let input = "\
bare
  synth-phore

  0  0  0  0  0  0  0  0  0  0999 V2000
M  END
$$$$
";
        let mol = read(Cursor::new(input)).expect("parses");
        assert_eq!(mol.name, "bare");
        assert_eq!(mol.atom_count(), 0);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(SdfReader::new(Cursor::new("")).next().is_none());
        assert!(SdfReader::new(Cursor::new("\n\n")).next().is_none());
        let err = read(Cursor::new("")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
