//! Packed byte encoding of a condition tree: the bytes that get stored
//! on-chain and that the deployment address is derived from.
//!
//! The tree is flattened breadth-first, so each node's children are
//! contiguous and every node's parent index is lower than its own (the root
//! is its own parent, index 0).
//!
//! ```text
//! u8                         node count (at most 255)
//! [u8 parent, u8 type_op]    per node; type_op = paramType << 5 | operator
//! [u16 len, bytes]           per leaf, in BFS order; len 0 = no compValue
//! ```

use rolescope_core::{Condition, Error, Operator, ParamType, Result};

/// Largest tree the packed encoding can hold.
pub const MAX_PACKED_NODES: usize = u8::MAX as usize;

/// A node of the breadth-first flattening.
#[derive(Debug, Clone, Copy)]
pub struct FlatNode<'a> {
    pub parent: usize,
    pub condition: &'a Condition,
}

/// Flatten `condition` breadth-first.
pub fn flatten_breadth_first(condition: &Condition) -> Vec<FlatNode<'_>> {
    let mut nodes = vec![FlatNode {
        parent: 0,
        condition,
    }];
    let mut cursor = 0;
    while cursor < nodes.len() {
        let current = nodes[cursor].condition;
        nodes.extend(current.children().iter().map(|child| FlatNode {
            parent: cursor,
            condition: child,
        }));
        cursor += 1;
    }
    nodes
}

/// Encode a condition tree.
pub fn pack(condition: &Condition) -> Result<Vec<u8>> {
    let nodes = flatten_breadth_first(condition);
    if nodes.len() > MAX_PACKED_NODES {
        return Err(Error::Encoding(format!(
            "condition has {} nodes, at most {MAX_PACKED_NODES} can be packed",
            nodes.len()
        )));
    }

    let mut out = Vec::with_capacity(1 + nodes.len() * 4);
    out.push(nodes.len() as u8);
    for node in &nodes {
        out.push(node.parent as u8);
        out.push(node.condition.param_type().code() << 5 | node.condition.operator().code());
    }
    for node in nodes.iter().filter(|n| n.condition.is_leaf()) {
        let operand = node.condition.comp_value().unwrap_or_default();
        let len = u16::try_from(operand.len()).map_err(|_| {
            Error::Encoding(format!(
                "compValue of {} bytes exceeds {} bytes",
                operand.len(),
                u16::MAX
            ))
        })?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(operand);
    }
    Ok(out)
}

/// Decode bytes produced by [`pack`].
pub fn unpack(bytes: &[u8]) -> Result<Condition> {
    let mut reader = Reader { bytes, offset: 0 };
    let count = reader.u8()? as usize;
    if count == 0 {
        return Err(Error::Encoding("packed condition has no nodes".into()));
    }

    let mut headers = Vec::with_capacity(count);
    for index in 0..count {
        let parent = reader.u8()? as usize;
        let type_op = reader.u8()?;
        let valid_parent = if index == 0 { parent == 0 } else { parent < index };
        if !valid_parent {
            return Err(Error::Encoding(format!(
                "node {index} has invalid parent {parent}"
            )));
        }
        let param_type = ParamType::from_code(type_op >> 5)
            .ok_or_else(|| Error::Encoding(format!("node {index}: unknown param type {}", type_op >> 5)))?;
        let operator = Operator::from_code(type_op & 0x1f)
            .ok_or_else(|| Error::Encoding(format!("node {index}: unknown operator {}", type_op & 0x1f)))?;
        headers.push((parent, param_type, operator));
    }

    let mut child_indices: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (index, (parent, ..)) in headers.iter().enumerate().skip(1) {
        child_indices[*parent].push(index);
    }

    let mut operands: Vec<Option<Vec<u8>>> = vec![None; count];
    for (index, indices) in child_indices.iter().enumerate() {
        if indices.is_empty() {
            let len = reader.u16()? as usize;
            operands[index] = Some(reader.take(len)?.to_vec());
        }
    }
    if reader.offset != bytes.len() {
        return Err(Error::Encoding(format!(
            "{} trailing bytes after packed condition",
            bytes.len() - reader.offset
        )));
    }

    // Children always come after their parent, so building from the back
    // has every child ready before its parent.
    let mut built: Vec<Option<Condition>> = vec![None; count];
    for index in (0..count).rev() {
        let (_, param_type, operator) = headers[index];
        let children = child_indices[index]
            .iter()
            .map(|&child| {
                built[child]
                    .take()
                    .ok_or_else(|| Error::Encoding(format!("node {child} referenced twice")))
            })
            .collect::<Result<Vec<_>>>()?;
        built[index] = Some(Condition::new(
            param_type,
            operator,
            operands[index].take(),
            children,
        )?);
    }
    built[0]
        .take()
        .ok_or_else(|| Error::Encoding("packed condition has no root".into()))
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset + len;
        let slice = self.bytes.get(self.offset..end).ok_or_else(|| {
            Error::Encoding(format!(
                "unexpected end of packed condition at byte {}",
                self.offset
            ))
        })?;
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn breadth_first_order() {
        let tree = calldata(vec![tuple(vec![c(1), c(2)]), c(3)]);
        let flat = flatten_breadth_first(&tree);
        let parents: Vec<usize> = flat.iter().map(|n| n.parent).collect();
        assert_eq!(parents, vec![0, 0, 0, 1, 1]);
        assert_eq!(flat[2].condition, &c(3));
        assert_eq!(flat[3].condition, &c(1));
    }

    #[test]
    fn packed_layout() {
        let tree = calldata(vec![c(1), pass()]);
        let packed = pack(&tree).unwrap();
        assert_eq!(packed[0], 3);
        // root: parent 0, Calldata(5) << 5 | Matches(5)
        assert_eq!(&packed[1..3], &[0, 5 << 5 | 5]);
        // EqualTo(16) on Static(1)
        assert_eq!(&packed[3..5], &[0, 1 << 5 | 16]);
        assert_eq!(&packed[5..7], &[0, 1 << 5]);
        // leaf operands: 32-byte word, then an empty one for Pass
        assert_eq!(&packed[7..9], &[0, 32]);
        assert_eq!(packed[40], 1);
        assert_eq!(&packed[41..43], &[0, 0]);
        assert_eq!(packed.len(), 43);
    }

    #[test]
    fn unpack_restores_tree() {
        let tree = calldata(vec![c(1), or(vec![tuple(vec![c(2), dynamic(3)]), c(4)]), allowance(5)]);
        let restored = unpack(&pack(&tree).unwrap()).unwrap();
        assert_eq!(restored, tree);
    }

    #[test]
    fn oversized_tree_rejected() {
        let leaves: Vec<Condition> = (0..=255u8).map(c).collect();
        let err = pack(&or(leaves)).unwrap_err();
        assert!(err.to_string().contains("at most 255"));
    }

    #[test]
    fn malformed_bytes_rejected() {
        assert!(unpack(&[]).is_err());
        assert!(unpack(&[0]).is_err());
        // one node whose parent points forward
        assert!(unpack(&[2, 0, 0x25, 1, 0x20, 0, 0]).is_err());
        let mut packed = pack(&c(1)).unwrap();
        packed.push(0xff);
        assert!(unpack(&packed).is_err());
    }
}
