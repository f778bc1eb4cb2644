use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::ResultExt;
use crate::Error;

pub const LOCATIONS_FILE: &str = "locations.txt";
pub const CONTENTS_FILE: &str = "contents.txt";

const STATUS_PENDING: &str = "0";
const STATUS_RESTORED: &str = "1";

/// Appends a record pointing at the new restore location. Only touches a
/// file that still holds exactly its original single data line (plus the
/// trailing element the final newline produces) and whose data line does
/// not already end with `out_dir`. Re-running is a no-op.
pub fn update_locations(files: &[PathBuf], out_dir: &Path) -> Result<(), Error> {
    let out_dir = out_dir.to_string_lossy();

    for path in files {
        let input = fs::read_to_string(path).io_err(path)?;
        let lines: Vec<&str> = input.split('\n').collect();

        if lines.len() != 2 || lines[0].ends_with(out_dir.as_ref()) {
            continue;
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .io_err(path)?;

        writeln!(file, "1,1,1,{}", out_dir).io_err(path)?;
    }

    Ok(())
}

/// Flips the trailing status field of every record from "0" to "1",
/// marking the restored pieces usable. Lines whose last field is already
/// "1" (or anything else) pass through unchanged, so re-running is a no-op.
pub fn update_contents(files: &[PathBuf]) -> Result<(), Error> {
    for path in files {
        let input = fs::read_to_string(path).io_err(path)?;

        let updated = input
            .split('\n')
            .map(restore_line)
            .collect::<Vec<_>>()
            .join("\n");

        fs::write(path, updated).io_err(path)?;
    }

    Ok(())
}

fn restore_line(line: &str) -> String {
    let mut fields: Vec<&str> = line.split(',').collect();

    if let Some(last) = fields.last_mut() {
        if *last == STATUS_PENDING {
            *last = STATUS_RESTORED;
        }
    }

    fields.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing;

    #[test]
    fn locations_appends_the_new_restore_dir() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(LOCATIONS_FILE);
        fs::write(&path, "1,1,1,/orig\n").unwrap();

        update_locations(&[path.clone()], Path::new("/restore")).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1,1,1,/orig\n1,1,1,/restore\n"
        );
    }

    #[test]
    fn locations_already_pointing_at_out_dir_is_untouched() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(LOCATIONS_FILE);
        fs::write(&path, "1,1,1,/restore\n").unwrap();

        update_locations(&[path.clone()], Path::new("/restore")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "1,1,1,/restore\n");
    }

    #[test]
    fn locations_rerun_is_a_no_op() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(LOCATIONS_FILE);
        fs::write(&path, "1,1,1,/orig\n").unwrap();

        update_locations(&[path.clone()], Path::new("/restore")).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        // second pass sees more than one data line and leaves the file alone
        update_locations(&[path.clone()], Path::new("/restore")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn contents_flips_only_pending_status_fields() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(CONTENTS_FILE);
        fs::write(&path, "a,b,0\nc,d,1\n").unwrap();

        update_contents(&[path.clone()]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b,1\nc,d,1\n");
    }

    #[test]
    fn contents_rerun_is_a_no_op() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(CONTENTS_FILE);
        fs::write(&path, "a,b,0\nc,d,0\n").unwrap();

        update_contents(&[path.clone()]).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        update_contents(&[path.clone()]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn contents_leaves_field_count_alone() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join(CONTENTS_FILE);
        fs::write(&path, "one,0\n0\nx,y,z\n").unwrap();

        update_contents(&[path.clone()]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one,1\n1\nx,y,z\n");
    }
}
