use crate::model::molecule::Molecule;
use crate::model::types::BondOrder;
use std::collections::{HashMap, HashSet};

#[inline]
pub(crate) fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

pub(crate) fn bond_orders(molecule: &Molecule) -> HashMap<(usize, usize), BondOrder> {
    let mut orders = HashMap::with_capacity(molecule.bond_count());
    for bond in &molecule.bonds {
        orders.insert(edge_key(bond.i, bond.j), bond.order);
    }
    orders
}

/// Enumerates simple cycles of exactly `len` atoms. Each cycle is reported
/// once, rooted at its smallest atom index. This deliberately covers only
/// the ring sizes the feature rules care about, not a full SSSR.
pub fn cycles_of_len(adj: &[Vec<usize>], len: usize) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut found: HashSet<Vec<usize>> = HashSet::new();
    let mut stack: Vec<usize> = Vec::with_capacity(len);
    let mut visited = vec![false; n];

    fn dfs(
        adj: &[Vec<usize>],
        start: usize,
        current: usize,
        len: usize,
        stack: &mut Vec<usize>,
        visited: &mut [bool],
        found: &mut HashSet<Vec<usize>>,
    ) {
        if stack.len() == len {
            if adj[current].iter().any(|&v| v == start) {
                found.insert(canonical_cycle(stack));
            }
            return;
        }
        for &next in &adj[current] {
            // Rooting at the minimal index keeps each cycle from being
            // rediscovered from every other member.
            if next == start || next < start || visited[next] {
                continue;
            }
            visited[next] = true;
            stack.push(next);
            dfs(adj, start, next, len, stack, visited, found);
            stack.pop();
            visited[next] = false;
        }
    }

    for start in 0..n {
        visited[start] = true;
        stack.clear();
        stack.push(start);
        for &next in &adj[start] {
            if next < start {
                continue;
            }
            visited[next] = true;
            stack.push(next);
            dfs(adj, start, next, len, &mut stack, &mut visited, &mut found);
            stack.pop();
            visited[next] = false;
        }
        visited[start] = false;
    }

    found.into_iter().collect()
}

fn canonical_cycle(nodes: &[usize]) -> Vec<usize> {
    let n = nodes.len();
    let (min_i, _) = nodes
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| **v)
        .expect("cycle is non-empty");

    let mut forward = Vec::with_capacity(n);
    for k in 0..n {
        forward.push(nodes[(min_i + k) % n]);
    }
    let mut reverse = Vec::with_capacity(n);
    for k in 0..n {
        reverse.push(nodes[(min_i + n - (k % n)) % n]);
    }

    if reverse < forward { reverse } else { forward }
}

/// A ring is aromatic when every ring bond is marked aromatic, or when it is
/// a six-carbon ring with alternating single/double bonds (Kekulé form).
pub fn is_aromatic_ring(
    molecule: &Molecule,
    cycle: &[usize],
    orders: &HashMap<(usize, usize), BondOrder>,
) -> bool {
    let mut all_aromatic = true;
    for k in 0..cycle.len() {
        let a = cycle[k];
        let b = cycle[(k + 1) % cycle.len()];
        match orders.get(&edge_key(a, b)) {
            Some(BondOrder::Aromatic) => {}
            Some(_) => {
                all_aromatic = false;
            }
            None => return false,
        }
    }
    if all_aromatic {
        return true;
    }
    is_kekule_hexagon(molecule, cycle, orders)
}

fn is_kekule_hexagon(
    molecule: &Molecule,
    cycle: &[usize],
    orders: &HashMap<(usize, usize), BondOrder>,
) -> bool {
    use crate::model::types::Element;

    if cycle.len() != 6 {
        return false;
    }
    if cycle.iter().any(|&a| molecule.atoms[a].element != Element::C) {
        return false;
    }

    let mut kinds = [0u8; 6]; // 1 = single, 2 = double
    for k in 0..6 {
        let a = cycle[k];
        let b = cycle[(k + 1) % 6];
        kinds[k] = match orders.get(&edge_key(a, b)) {
            Some(BondOrder::Single) => 1,
            Some(BondOrder::Double) => 2,
            _ => return false,
        };
    }
    let singles = kinds.iter().filter(|&&k| k == 1).count();
    if singles != 3 {
        return false;
    }
    (0..6).all(|k| kinds[k] != kinds[(k + 1) % 6])
}
