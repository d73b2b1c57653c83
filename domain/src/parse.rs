use crate::Error;

pub(crate) fn int(value: Option<&str>, field: &'static str) -> Result<i32, Error> {
    value
        .ok_or(Error::MissingField(field))?
        .parse()
        .map_err(|err| Error::ParseInt(err, field))
}

pub(crate) fn decimal(value: Option<&str>, field: &'static str) -> Result<f64, Error> {
    value
        .ok_or(Error::MissingField(field))?
        .trim()
        .parse()
        .map_err(|err| Error::ParseFloat(err, field))
}

/// Year taken from the first four characters of a join date.
///
/// Dates that are absent or shorter than four characters yield `None`.
pub(crate) fn join_year(join_date: Option<&str>) -> Result<Option<i32>, Error> {
    let Some(date) = join_date else {
        return Ok(None);
    };
    let end = match date.char_indices().nth(4) {
        Some((index, _)) => index,
        None if date.chars().count() == 4 => date.len(),
        None => return Ok(None),
    };
    int(Some(&date[..end]), "join_date").map(Some)
}
