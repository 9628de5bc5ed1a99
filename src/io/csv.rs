/*!
# I/O Utilities for Saving Particle Clouds to CSV

This module provides a function to save the particles behind an estimate to a
CSV file. Enable via the `csv` feature.
*/

use num_traits::ToPrimitive;
use std::error::Error;
use std::fs::File;

use csv::Writer;

use crate::core::Particle;

/**
Saves a particle cloud as a CSV file.

The resulting CSV file will have:
- A header row containing `"particle"`, `"value"`, and `"log_weight"`.
- One subsequent row per particle, in particle-index order.

# Arguments

* `particles` - The cloud, e.g. from [`Posterior::particles`](crate::posterior::Posterior::particles).
* `filename` - The file path where the CSV data will be written.

# Returns

Returns `Ok(())` if successful, or an error if any I/O or CSV formatting
issue occurs.

# Examples

```rust
use mini_ppl::core::Particle;
use mini_ppl::io::csv::save_csv;

let cloud = vec![
    Particle { value: 0.5, log_weight: -1.2 },
    Particle { value: 1.5, log_weight: -0.3 },
];
save_csv(&cloud, "/tmp/particles.csv").expect("Expecting saving particles to succeed");
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn save_csv<T: ToPrimitive>(
    particles: &[Particle<T>],
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["particle", "value", "log_weight"])?;

    for (i, particle) in particles.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            particle.value.to_f64().unwrap().to_string(),
            particle.log_weight.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
