use utoipa::OpenApi;

use crate::nasa::ApodRecord;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nasa APOD API",
        version = "1.0",
        description = "API que busca APOD (Astronomy Picture Of the Day) da NASA e traduz título/explicação para pt-BR."
    ),
    paths(crate::routes::get_apod, crate::routes::get_apod_image),
    components(schemas(ApodRecord)),
    tags((name = "apod", description = "Astronomy Picture of the Day"))
)]
pub struct ApiDoc;
