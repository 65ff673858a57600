use std::path::PathBuf;
use feynman_path::{
    config::LayoutConfig,
    diagram::Diagram,
    gate::Gate,
    label::LabelCache,
    render::{ Formats, RenderJob },
};

// renders a few standard path sum diagrams and their circuits into
// `target/feynman-path-demos`
//
// set FEYNMAN_PATH_PNG=1 to also write PNG and PDF files (needs rsvg-convert)
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let out_dir = PathBuf::from("target").join("feynman-path-demos");
    std::fs::create_dir_all(&out_dir)?;
    let formats
        = if std::env::var_os("FEYNMAN_PATH_PNG").is_some() {
            Formats { svg: true, png: true, pdf: true }
        } else {
            Formats::svg()
        };
    let labels = LabelCache::default();

    let jobs: [(&str, usize, &str); 3] = [
        ("interference", 2, "h0 cnot0,1 z1 h0 h1 cnot1,0 h1"),
        ("entanglement", 2, "h0 cnot0,1 h0 h1"),
        ("no-entanglement", 2, "h0 h1 cnot0,1 h0 h1"),
    ];
    for (name, n, gates) in jobs {
        for circuit in [false, true] {
            RenderJob::new(name, n, gates.split_whitespace())
                .with_circuit(circuit)
                .with_formats(formats)
                .with_scale(3.0)
                .with_out_dir(&out_dir)
                .run(&labels)?;
        }
    }

    // build this one by hand to highlight CNOT_12
    RenderJob::new(
        "no-interference",
        3,
        "h0 cnot0,1 z1 cnot1,2 h0 h1 cnot1,0 h1".split_whitespace(),
    )
        .with_circuit(true)
        .with_out_dir(&out_dir)
        .run(&labels)?;
    let mut diagram
        = Diagram::new(3, None, LayoutConfig::for_qubits(3), &labels)?;
    diagram.apply(&Gate::H(0))?;
    diagram.apply(&Gate::Cnot(0, 1))?;
    diagram.apply(&Gate::Z(1))?;
    diagram.apply_styled(&Gate::Cnot(1, 2), "\\color{red!80!black}")?;
    diagram.apply(&Gate::H(0))?;
    diagram.apply(&Gate::H(1))?;
    diagram.apply(&Gate::Cnot(1, 0))?;
    diagram.apply(&Gate::H(1))?;
    let drawing = diagram.draw();
    drawing.save_svg(out_dir.join("no-interference.svg"))?;
    if formats.png {
        drawing.save_png(out_dir.join("no-interference.png"), 3.0)?;
        drawing.save_pdf(out_dir.join("no-interference.pdf"))?;
    }

    println!("rendered {} labels into {}", labels.len(), out_dir.display());
    Ok(())
}
