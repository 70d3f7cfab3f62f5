use houghtune::batch::synthesize_rings;

fn main() -> anyhow::Result<()> {
    // Four concentric rings plus one offset ring
    let mut img = synthesize_rings(500, (250, 250), &[50, 100, 150, 200], 2);
    let offset = synthesize_rings(500, (420, 80), &[35], 3);
    for (x, y, p) in offset.enumerate_pixels() {
        if p[0] > 0 {
            img.put_pixel(x, y, *p);
        }
    }

    img.save("test_circles.bmp")?;
    println!("Created test_circles.bmp (500x500, 5 rings)");
    Ok(())
}
