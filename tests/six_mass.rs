//! End-to-end generation for a chain of six masses connected by springs
//! and dampers, hanging under gravity with a specified force on each
//! mass: 19 constants, 6 coordinates, 6 speeds, 6 specified inputs, a
//! 6x6 mass matrix and a 6x1 forcing vector.

use eomgen::ir::analysis::symbols::expr_symbols;
use eomgen::{ArgumentGroup, Expr, Matrix, MatrixGenerator, Symbol};
use indexmap::{IndexMap, IndexSet};
use ndarray::Array2;
use unindent::unindent;

fn sym(name: &str) -> Expr {
    Expr::symbol(name)
}

fn constants() -> Vec<Symbol> {
    [
        "c1", "c2", "k5", "m1", "k0", "c3", "c5", "k1", "c4", "m4", "k2", "k3", "m5", "m2", "m3",
        "k4", "c0", "g", "m0",
    ]
    .iter()
    .map(|name| Symbol::new(*name))
    .collect()
}

fn coordinates() -> Vec<Symbol> {
    (0..6)
        .map(|i| Symbol::time_dependent(format!("x{i}")))
        .collect()
}

fn speeds() -> Vec<Symbol> {
    (0..6)
        .map(|i| Symbol::time_dependent(format!("v{i}")))
        .collect()
}

fn specified() -> Vec<Symbol> {
    ["f5", "f2", "f3", "f0", "f4", "f1"]
        .iter()
        .map(|name| Symbol::time_dependent(*name))
        .collect()
}

/// Cumulative masses below each attachment point, shared between matrix
/// entries: `totals[k]` is the mass carried by coordinate `k`.
fn mass_totals() -> Vec<Expr> {
    let mut totals = vec![sym("m5")];
    for k in (0..5).rev() {
        let above = totals.last().unwrap().clone();
        totals.push(sym(&format!("m{k}")) + above);
    }
    totals.reverse();
    totals
}

fn mass_matrix() -> Matrix {
    let totals = mass_totals();
    Array2::from_shape_fn((6, 6), |(i, j)| totals[i.max(j)].clone())
}

fn forcing() -> Matrix {
    // Gravity-plus-force contributions of everything hanging below each
    // mass, shared between rows.
    let weight = |j: usize| {
        sym("g") * sym(&format!("m{j}")) + Expr::time_symbol(format!("f{j}"))
    };
    let mut tails: Vec<Expr> = vec![weight(5)];
    for j in (1..5).rev() {
        let below = tails.last().unwrap().clone();
        tails.push(weight(j) + below);
    }
    tails.reverse(); // tails[j - 1] belongs to mass j

    let damping = |j: usize| {
        -(sym(&format!("c{j}")) * Expr::time_symbol(format!("v{j}")))
            - sym(&format!("k{j}")) * Expr::time_symbol(format!("x{j}"))
    };

    let mut rows = Vec::with_capacity(6);
    rows.push(damping(0) + sym("g") * sym("m0") + Expr::time_symbol("f0") + tails[0].clone());
    for j in 1..6 {
        rows.push(damping(j) + tails[j - 1].clone());
    }
    Array2::from_shape_vec((6, 1), rows).unwrap()
}

fn groups() -> Vec<ArgumentGroup> {
    vec![
        ArgumentGroup::new(constants()),
        ArgumentGroup::new(coordinates()),
        ArgumentGroup::new(speeds()),
        ArgumentGroup::new(specified()),
    ]
}

fn generator() -> MatrixGenerator {
    MatrixGenerator::new(vec![mass_matrix(), forcing()], groups()).unwrap()
}

#[test]
fn test_construction_keeps_inputs() {
    let generator = generator();
    assert_eq!(generator.matrices(), &[mass_matrix(), forcing()]);
    assert_eq!(generator.argument_groups(), groups().as_slice());
}

#[test]
fn test_missing_specified_group_fails() {
    let short = groups()[..3].to_vec();
    let err = MatrixGenerator::new(vec![mass_matrix(), forcing()], short).unwrap_err();
    assert!(matches!(err, eomgen::GenError::UncoveredSymbols(_)));
}

#[test]
fn test_subexpressions_shared_across_both_matrices() {
    let generator = generator();
    let subs = generator.subexpressions();

    // Four cumulative-mass sums from the mass matrix, then five
    // weight-plus-force tails from the forcing vector.
    assert_eq!(subs.len(), 9);
    let names: Vec<&str> = subs.iter().map(|s| s.symbol.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "eom_0", "eom_1", "eom_2", "eom_3", "eom_4", "eom_5", "eom_6", "eom_7", "eom_8"
        ]
    );

    let t = |name: &str| Expr::symbol(name);
    assert_eq!(subs[0].expr, sym("m4") + sym("m5"));
    assert_eq!(subs[1].expr, sym("m3") + t("eom_0"));
    assert_eq!(subs[2].expr, sym("m2") + t("eom_1"));
    assert_eq!(subs[3].expr, sym("m1") + t("eom_2"));
    assert_eq!(
        subs[4].expr,
        sym("g") * sym("m5") + Expr::time_symbol("f5")
    );
    assert_eq!(
        subs[8].expr,
        sym("g") * sym("m1") + Expr::time_symbol("f1") + t("eom_7")
    );
}

#[test]
fn test_no_forward_references() {
    let generator = generator();
    let mut defined: IndexSet<Symbol> = IndexSet::new();
    for sub in generator.subexpressions() {
        let mut used = IndexSet::new();
        expr_symbols(&sub.expr, &mut used);
        for symbol in used {
            if symbol.name.starts_with("eom_") {
                assert!(defined.contains(&symbol), "forward reference to {symbol}");
            }
        }
        defined.insert(sub.symbol.clone());
    }
}

/// Transitively substitute temporary definitions back into `expr`.
fn expand(expr: &Expr, defs: &IndexMap<Symbol, Expr>) -> Expr {
    use std::sync::Arc;
    match expr {
        Expr::Symbol(symbol) => match defs.get(symbol) {
            Some(def) => expand(def, defs),
            None => expr.clone(),
        },
        Expr::Integer(_) | Expr::Float(_) => expr.clone(),
        Expr::Add(l, r) => Expr::Add(Arc::new(expand(l, defs)), Arc::new(expand(r, defs))),
        Expr::Sub(l, r) => Expr::Sub(Arc::new(expand(l, defs)), Arc::new(expand(r, defs))),
        Expr::Mul(l, r) => Expr::Mul(Arc::new(expand(l, defs)), Arc::new(expand(r, defs))),
        Expr::Div(l, r) => Expr::Div(Arc::new(expand(l, defs)), Arc::new(expand(r, defs))),
        Expr::Pow(l, r) => Expr::Pow(Arc::new(expand(l, defs)), Arc::new(expand(r, defs))),
        Expr::Neg(inner) => Expr::Neg(Arc::new(expand(inner, defs))),
        Expr::Call { name, args } => Expr::Call {
            name: name.clone(),
            args: args.iter().map(|a| expand(a, defs)).collect(),
        },
    }
}

#[test]
fn test_substitution_recovers_originals() {
    let generator = generator();
    let defs: IndexMap<Symbol, Expr> = generator
        .subexpressions()
        .iter()
        .map(|s| (s.symbol.clone(), s.expr.clone()))
        .collect();

    for (original, simplified) in generator
        .matrices()
        .iter()
        .zip(generator.simplified_matrices())
    {
        assert_eq!(original.dim(), simplified.dim());
        for (lhs, rhs) in original.iter().zip(simplified.iter()) {
            assert_eq!(*lhs, expand(rhs, &defs));
        }
    }
}

#[test]
fn test_comma_lists() {
    let generator = generator();
    assert_eq!(
        generator.comma_lists(),
        vec![
            "c1, c2, k5, m1, k0, c3, c5, k1, c4, m4, k2, k3, m5, m2, m3, k4, c0, g, m0",
            "x0(t), x1(t), x2(t), x3(t), x4(t), x5(t)",
            "v0(t), v1(t), v2(t), v3(t), v4(t), v5(t)",
            "f5(t), f2(t), f3(t), f0(t), f4(t), f1(t)",
        ]
    );
}

#[test]
fn test_code_blocks() {
    let generator = generator();
    let blocks = generator.code_blocks();

    assert_eq!(
        blocks.input_args,
        unindent(
            "
            double input_0[19],
            double input_1[6],
            double input_2[6],
            double input_3[6],"
        )
        .lines()
        .map(|line| format!("              {line}"))
        .collect::<Vec<_>>()
        .join("\n")
    );

    assert_eq!(
        blocks.output_args,
        "              double output_0[36],\n              double output_1[6]"
    );

    assert_eq!(
        blocks.input_docstring,
        unindent(
            "
            input_0[19] : [c1, c2, k5, m1, k0, c3, c5, k1, c4, m4, k2, k3, m5, m2, m3, k4,
            c0, g, m0]
            input_1[6] : [x0(t), x1(t), x2(t), x3(t), x4(t), x5(t)]
            input_2[6] : [v0(t), v1(t), v2(t), v3(t), v4(t), v5(t)]
            input_3[6] : [f5(t), f2(t), f3(t), f0(t), f4(t), f1(t)]"
        )
    );

    let expected_subexprs = concat!(
        "    double eom_0 = input_0[9] + input_0[12];\n",
        "    double eom_1 = input_0[14] + eom_0;\n",
        "    double eom_2 = input_0[13] + eom_1;\n",
        "    double eom_3 = input_0[3] + eom_2;\n",
        "    double eom_4 = input_0[17]*input_0[12] + input_3[0];\n",
        "    double eom_5 = input_0[17]*input_0[9] + input_3[4] + eom_4;\n",
        "    double eom_6 = input_0[17]*input_0[14] + input_3[2] + eom_5;\n",
        "    double eom_7 = input_0[17]*input_0[13] + input_3[1] + eom_6;\n",
        "    double eom_8 = input_0[17]*input_0[3] + input_3[5] + eom_7;",
    );
    assert_eq!(blocks.subexprs, expected_subexprs);

    let totals = ["eom_3", "eom_2", "eom_1", "eom_0"];
    let mut expected_outputs = vec!["    output_0[0] = input_0[18] + eom_3;".to_string()];
    for k in 1..36 {
        let (i, j) = (k / 6, k % 6);
        let value = if i.max(j) == 5 {
            "input_0[12]"
        } else {
            totals[i.max(j) - 1]
        };
        expected_outputs.push(format!("    output_0[{k}] = {value};"));
    }
    expected_outputs.push(String::new());
    expected_outputs.extend(
        [
            "    output_1[0] = -input_0[16]*input_2[0] - input_0[4]*input_1[0] +",
            "    input_0[17]*input_0[18] + input_3[3] + eom_8;",
            "    output_1[1] = -input_0[0]*input_2[1] - input_0[7]*input_1[1] + eom_8;",
            "    output_1[2] = -input_0[1]*input_2[2] - input_0[10]*input_1[2] + eom_7;",
            "    output_1[3] = -input_0[5]*input_2[3] - input_0[11]*input_1[3] + eom_6;",
            "    output_1[4] = -input_0[8]*input_2[4] - input_0[15]*input_1[4] + eom_5;",
            "    output_1[5] = -input_0[6]*input_2[5] - input_0[2]*input_1[5] + eom_4;",
        ]
        .iter()
        .map(|line| line.to_string()),
    );
    assert_eq!(blocks.outputs, expected_outputs.join("\n"));
}

fn expected_header() -> String {
    unindent(
        "
        void evaluate(
                      double input_0[19],
                      double input_1[6],
                      double input_2[6],
                      double input_3[6],
                      double output_0[36],
                      double output_1[6]
                     );
        /*

        input_0[19] : [c1, c2, k5, m1, k0, c3, c5, k1, c4, m4, k2, k3, m5, m2, m3, k4,
        c0, g, m0]
        input_1[6] : [x0(t), x1(t), x2(t), x3(t), x4(t), x5(t)]
        input_2[6] : [v0(t), v1(t), v2(t), v3(t), v4(t), v5(t)]
        input_3[6] : [f5(t), f2(t), f3(t), f0(t), f4(t), f1(t)]

        */",
    )
}

#[test]
fn test_render_header() {
    let generator = generator();
    let (header, _) = generator.render(Some("six_mass")).unwrap();
    assert_eq!(header, expected_header());

    // The header does not depend on the prefix.
    let (header, _) = generator.render(None).unwrap();
    assert_eq!(header, expected_header());
}

#[test]
fn test_render_source_include_line() {
    let generator = generator();
    let blocks = generator.code_blocks();

    let signature = concat!(
        "void evaluate(\n",
        "              double input_0[19],\n",
        "              double input_1[6],\n",
        "              double input_2[6],\n",
        "              double input_3[6],\n",
        "              double output_0[36],\n",
        "              double output_1[6]\n",
        "             )",
    );
    let body = format!("{{\n\n{}\n\n{}\n\n}}", blocks.subexprs, blocks.outputs);

    let (_, source) = generator.render(Some("six_mass")).unwrap();
    assert_eq!(
        source,
        format!("#include <math.h>\n#include \"six_mass.h\"\n\n{signature}\n{body}")
    );

    // No prefix: the include line is omitted entirely, not left blank.
    let (_, source) = generator.render(None).unwrap();
    assert_eq!(source, format!("#include <math.h>\n\n{signature}\n{body}"));
}

#[test]
fn test_render_is_byte_stable() {
    let first = generator().render(Some("six_mass")).unwrap();
    let second = generator().render(Some("six_mass")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_write_persists_rendered_text() {
    let generator = generator();

    let dir = std::env::temp_dir().join(format!("eomgen_six_mass_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let prefix = dir.join("six_mass");
    let prefix = prefix.to_str().unwrap();

    let (header, source) = generator.render(Some(prefix)).unwrap();
    generator.write(prefix).unwrap();

    assert_eq!(
        std::fs::read_to_string(format!("{prefix}.h")).unwrap(),
        header
    );
    assert_eq!(
        std::fs::read_to_string(format!("{prefix}.c")).unwrap(),
        source
    );

    // Overwrites an existing pair.
    generator.write(prefix).unwrap();
    assert_eq!(
        std::fs::read_to_string(format!("{prefix}.c")).unwrap(),
        source
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
