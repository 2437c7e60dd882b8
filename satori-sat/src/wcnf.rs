//! Weighted DIMACS writer.
//!
//! Format: `p wcnf <vars> <clauses> <top>` followed by one clause per line,
//! each prefixed with its weight and terminated by `0`. Hard clauses carry
//! the `top` weight (greater than the sum of all soft weights); soft
//! assumptions are written as weighted unit clauses.

use std::io::{self, Write};

use crate::Lit;

fn dimacs_lit(l: Lit) -> i64 {
    let v = i64::from(l.var().0) + 1;
    if l.is_positive() {
        v
    } else {
        -v
    }
}

/// Write hard clauses plus weighted soft units in `wcnf` form.
pub fn write_wcnf<W: Write>(
    out: &mut W,
    num_vars: usize,
    hard: &[&[Lit]],
    soft: &[Lit],
    weights: &[u64],
) -> io::Result<()> {
    debug_assert_eq!(soft.len(), weights.len());
    let top = weights.iter().sum::<u64>().saturating_add(1);
    writeln!(out, "p wcnf {} {} {}", num_vars, hard.len() + soft.len(), top)?;
    for clause in hard {
        write!(out, "{top}")?;
        for &l in *clause {
            write!(out, " {}", dimacs_lit(l))?;
        }
        writeln!(out, " 0")?;
    }
    for (&l, &w) in soft.iter().zip(weights.iter()) {
        writeln!(out, "{} {} 0", w, dimacs_lit(l))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Var;

    #[test]
    fn test_wcnf_layout() {
        let a = Var(0);
        let b = Var(1);
        let hard_clause = [Lit::pos(a), Lit::neg(b)];
        let hard: Vec<&[Lit]> = vec![&hard_clause];
        let soft = [Lit::pos(b)];
        let weights = [3u64];

        let mut out = Vec::new();
        write_wcnf(&mut out, 2, &hard, &soft, &weights).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("p wcnf 2 2 4"));
        assert_eq!(lines.next(), Some("4 1 -2 0"));
        assert_eq!(lines.next(), Some("3 2 0"));
        assert_eq!(lines.next(), None);
    }
}
