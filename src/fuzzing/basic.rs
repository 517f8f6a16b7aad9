use std::collections::BTreeMap;

use super::*;

qc!(hierarchy, _hierarchy);
fn _hierarchy((ops, queries): (Vec<Operation<TestPrefix, u8>>, Vec<TestPrefix>)) -> bool {
    let mut tree = Tree::ipv4();
    let mut reference = Reference::default();
    for op in ops {
        if !reference.apply(&mut tree, op) {
            return false;
        }
    }

    queries.iter().all(|q| {
        let exp = reference.find_tags(q);
        let exp_host = reference.find_tags(&q.host());
        tree.find_prefix_tags(q).unwrap().into_iter().copied().eq(exp)
            && tree
                .find_prefix_tags(&q.host())
                .unwrap()
                .into_iter()
                .copied()
                .eq(exp_host)
    })
}

qc!(searcher_matches_tree, _searcher_matches_tree);
fn _searcher_matches_tree((ops, hosts): (Vec<Operation<TestPrefix, u8>>, Vec<u32>)) -> bool {
    let mut tree = Tree::ipv4();
    let mut reference = Reference::default();
    for op in ops {
        reference.apply(&mut tree, op);
    }

    let mut searcher = tree.searcher();
    let mut out = Vec::new();
    hosts.into_iter().all(|host| {
        let addr = host.to_be_bytes();
        out.clear();
        searcher.find_tags_into(&addr, 32, &mut out).unwrap();
        let direct = tree.find_tags(&addr, 32).unwrap();
        out == direct && searcher.find_tags(&addr, 32).unwrap() == direct
    })
}

qc!(compaction, _compaction);
fn _compaction(ops: Vec<Operation<TestPrefix, u8>>) -> bool {
    let mut tree = Tree::ipv4();
    let mut reference = Reference::default();
    for op in ops {
        if !reference.apply(&mut tree, op) || !is_compact(&tree) {
            return false;
        }
    }
    tree.count_tags() == reference.0.len()
}

qc!(delete_everything, _delete_everything);
fn _delete_everything(list: Vec<(TestPrefix, u8)>) -> bool {
    let mut tree = Tree::ipv4();
    for (p, t) in &list {
        tree.add_prefix(p, *t).unwrap();
    }
    let any = |_: &u8, _: &()| true;
    for (p, _) in list.iter().rev() {
        tree.delete_prefix(p, any, &()).unwrap();
        if !is_compact(&tree) {
            return false;
        }
    }
    tree.count_nodes() == 1 && tree.is_empty()
}

qc!(iteration, _iteration);
fn _iteration(ops: Vec<Operation<TestPrefix, u8>>) -> bool {
    let mut tree = Tree::ipv4();
    let mut reference = Reference::default();
    for op in ops {
        reference.apply(&mut tree, op);
    }

    let mut exp: BTreeMap<(Vec<u8>, u8), Vec<u8>> = BTreeMap::new();
    for (p, t) in &reference.0 {
        let bytes = (p.1 as usize + 7) / 8;
        exp.entry((p.0.to_be_bytes()[..bytes].to_vec(), p.1))
            .or_default()
            .push(*t);
    }

    let acq: Vec<_> = tree
        .iter()
        .map(|(addr, len, tags)| ((addr, len), tags.to_vec()))
        .collect();
    // pre-order yields parents before children, and left before right
    let mut sorted = acq.clone();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    acq == sorted && acq.into_iter().eq(exp)
}

qc!(bit_codec, _bit_codec);
fn _bit_codec((data, n): (Vec<u8>, usize)) -> bool {
    let n = n % (data.len() * 8 + 1);
    let mut buf = Vec::new();
    if bits::unpack_bits(&mut buf, &data, n).is_err() || buf.len() != n {
        return false;
    }
    let mut exp = data[..(n + 7) / 8].to_vec();
    if n % 8 != 0 {
        if let Some(last) = exp.last_mut() {
            *last &= 0xffu8 << (8 - n % 8);
        }
    }
    let too_many = data.len() * 8 + 1;
    bits::pack_bits(&buf) == exp
        && bits::unpack_bits(&mut buf, &data, too_many).is_err()
        && buf.is_empty()
}
