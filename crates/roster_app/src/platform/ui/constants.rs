pub const PROMPT: &str = "roster> ";

pub const HELP: &str = "\
Commands:
  open <path>        select a roster spreadsheet (quoted or dropped paths work)
  clear              remove the selected file
  next | back        move between steps
  year <n>           target year
  month <n>          target month (1-12)
  order <a>|<b>|...  staff ordering, one name per entry
  order-clear        let the generator choose the order
  autofill           copy the previewed staff list into the ordering
  generate           build the roster
  download           save the generated roster
  restart            start over
  periods            list selectable periods
  help               show this text
  quit               exit";

pub const TAG_PUBLIC_POST: &str = "[公]";
pub const TAG_CONTRACT: &str = "[契]";
pub const TAG_UNCLASSIFIED: &str = "[  ]";
